fn main() {
    macroasm::cli::run();
}
