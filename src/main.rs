mod app;

use std::error::Error;
use clap::Parser;
use ss::config::set_silent;
use ss::ss_log;
use crate::app::SS;

fn main() -> Result<(), Box<dyn Error>> {
    let mut ss = SS::parse();
    set_silent(!ss.verbose);
    ss_log!("Run args: {:?}", ss);
    ss.run()?;
    Ok(())
}
