fn main() {
    let code = pydemit_cli::run_cli(std::env::args().collect());
    std::process::exit(code);
}
