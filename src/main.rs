fn main() -> Result<(), Box<dyn std::error::Error>> {
    scrollfold::cli::main()
}
