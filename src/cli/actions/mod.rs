use crate::cli::globals::GlobalArgs;

pub mod run;

#[derive(Debug)]
pub enum Action {
    Run(GlobalArgs),
}
