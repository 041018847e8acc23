fn main() {
    if let Err(e) = bkclinic_lib::run() {
        eprintln!("bkclinic: {e}");
        std::process::exit(1);
    }
}
