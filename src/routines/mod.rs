// Routines for reading data
pub mod datafile;
// Routines for logging
pub mod logger;
// Routines for optimization
pub mod optimization;
// Routines for output
pub mod output;
// Routines for settings
pub mod settings;
