pub mod input_buffer;
pub mod pie_chart;
