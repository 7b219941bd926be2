/// Domain layer - build dependency models and the pipeline services over them
pub mod domain;
pub mod services;
