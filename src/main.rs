fn main() {
    cool_ast::cli::run();
}
