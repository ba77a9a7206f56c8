fn main() {
    bracket_layout::run()
}
