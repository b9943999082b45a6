fn main() {
    env_logger::init();
    std::process::exit(ippcode20_cli::run(std::env::args()));
}
