pub mod angles;

pub use angles::{
    PI_HALF, TWO_PI, constrain_angle, delta_r, pt_hat, sign_flip, wrap_delta_phi,
    wrap_dijet_delta_phi,
};
