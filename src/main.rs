mod app;
mod bubble;
mod category;
mod chat;
mod clock;
mod config;
mod feed;
mod growth;
mod idle;
mod input;
mod interact;
mod model;
mod motion;
mod needs;
mod pet;
mod reactor;
mod render;
mod rng;
mod room;
mod routine;
mod storage;

#[cfg(test)]
mod tests;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    app::run(config::Cli::parse())
}
