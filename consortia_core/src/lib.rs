//! Core rust implementation of consortia, a crate for building constraint based models of
//! microbial communities out of single organism metabolic models.

pub mod community;
pub mod configuration;
pub mod io;
pub mod metabolic_model;
