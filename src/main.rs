use kindred::cli::Cli;

fn main() {
    Cli::run();
}
