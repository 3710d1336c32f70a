use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    community_digest::cli::run_digest(std::env::args().skip(1))
}
