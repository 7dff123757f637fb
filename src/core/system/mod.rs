pub mod frame_delta;
pub mod system_order;
