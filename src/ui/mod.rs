mod output;

pub use output::{print_banner, print_catalog, print_fatal, print_invocation, print_report};
