//! demos/plot_decomposition.rs
//!
//! Decomposes the daily PM10 series of Dongsi and plots the trend and seasonal parts
//! next to the observed values.
//!
//! To run this example:
//! cargo run --example plot_decomposition --features examples

use airquality::{decompose, AirQuality, Station};
use plotlars::{Line, Plot, Rgb, Text, TimeSeriesPlot};
use polars::prelude::*;
use std::error::Error;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let session = AirQuality::new().await?;
    let preprocessed = session.preprocessed().await?;

    let decomposition = decompose(preprocessed.station(Station::Dongsi))?;
    let data = decomposition.to_frame()?;

    println!("Generating decomposition plot...");
    plot_components(&data);
    println!("Plot shown in browser.");

    Ok(())
}

fn plot_components(data: &DataFrame) {
    TimeSeriesPlot::builder()
        .data(data)
        .x("date")
        .y("observed")
        .additional_series(vec!["trend", "seasonal"])
        .colors(vec![Rgb(180, 180, 180), Rgb(235, 117, 0), Rgb(69, 157, 230)])
        .lines(vec![Line::Solid, Line::Solid, Line::Dash])
        .plot_title(Text::from("Dongsi daily PM10").font("Arial").size(18))
        .x_title("date")
        .y_title("PM10")
        .build()
        .plot();
}
