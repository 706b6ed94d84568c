//! Fetch a URL and print its status code.
//!
//!   cargo run -p http-client-core --example get -- https://www.google.com/

use http_client_core::{Headers, HttpClient, QueryParameters};

fn main() {
    env_logger::init();

    let url = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "https://www.google.com/".to_string());

    let mut client = HttpClient::new();
    let mut headers = Headers::new();
    headers.set("Accept", "*/*").set("User-Agent", "HttpClient");

    match client.get_with(&url, &QueryParameters::new(), &headers) {
        Ok(resp) => println!("Status Code: {}", resp.status_code),
        Err(e) => {
            eprintln!("The request threw an error: {e}");
            std::process::exit(1);
        }
    }
}
