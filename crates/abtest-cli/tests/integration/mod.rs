mod analysis;
mod binary;
mod config;
mod wrangle;
