pub mod blocks;
pub mod entity;
pub mod geom;
pub mod physics;
pub mod rules;
