pub mod frame;
pub mod gl_quad;
pub mod projection;
pub mod view;
pub mod viewport;
