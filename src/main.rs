fn main() {
    orbview::native_main();
}
