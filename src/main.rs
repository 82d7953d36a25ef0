fn main() {
    if let Err(err) = heaps_lib::run() {
        eprintln!("heaps: {}", err);
        std::process::exit(1);
    }
}
