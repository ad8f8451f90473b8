use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    lilith::cli::main()
}
