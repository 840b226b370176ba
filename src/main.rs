fn main() {
    camwatch_lib::run()
}
