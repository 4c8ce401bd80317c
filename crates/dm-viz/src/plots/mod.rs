pub mod mass_spectrum;

mod axes_draw;
