//! demos/dashboard.rs
//!
//! Opens a session on the public dataset and prints every dashboard page as JSON.
//! If the download fails each page prints the error message instead.
//!
//! To run this example:
//! cargo run --example dashboard

use airquality::{AirQuality, Dashboard, Page, Station};
use std::error::Error;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let session = AirQuality::new().await?;
    println!("Loading {}", session.source());

    let dashboard = Dashboard::open(&session).await;
    for page in Page::ALL {
        let rendered = dashboard
            .render(page)
            .station(Station::Wanliu)
            .call();
        println!("== {} ==", page);
        match rendered.message() {
            Some(text) => println!("{}", text),
            None => println!("{}", serde_json::to_string_pretty(&rendered)?),
        }
    }

    Ok(())
}
