//! Cart-pole dynamics.
use std::f64::consts::PI;

/// State of a cart-pole, `[x, theta, x_dot, theta_dot]`.
///
/// `theta` is zero with the pole upright.
pub type State = [f64; 4];

/// Equations of motion of a cart-pole integrated with the classic
/// fourth-order Runge-Kutta method.
#[derive(Debug, Clone, PartialEq)]
pub struct CartpoleDynamics {
    g: f64,
    m: f64,
    l: f64,
    ml: f64,
    mass: f64,
    dt: f64,
}

impl CartpoleDynamics {
    /// Constructs the dynamics.
    ///
    /// * `g` - gravitational acceleration.
    /// * `pole_mass`, `pole_length`, `cart_mass` - physical parameters.
    /// * `dt` - the integration step in seconds.
    pub fn new(g: f64, pole_mass: f64, pole_length: f64, cart_mass: f64, dt: f64) -> Self {
        Self {
            g,
            m: pole_mass,
            l: pole_length,
            ml: pole_mass * pole_length,
            mass: pole_mass + cart_mass,
            dt,
        }
    }

    /// Integrates one step under the force `u`.
    ///
    /// `theta` of the result is wrapped into `[-pi, pi)`.
    pub fn step(&self, s: &State, u: f64) -> State {
        let dt = self.dt;
        let k1 = self.differential(s, u);
        let k2 = self.differential(&euler(s, &k1, dt / 2.0), u);
        let k3 = self.differential(&euler(s, &k2, dt / 2.0), u);
        let k4 = self.differential(&euler(s, &k3, dt), u);

        let mut next = *s;
        for i in 0..next.len() {
            next[i] += (k1[i] + 2.0 * k2[i] + 2.0 * k3[i] + k4[i]) * dt / 6.0;
        }
        next[1] = normalize(next[1]);
        next
    }

    /// Time derivative of the state.
    pub fn differential(&self, s: &State, u: f64) -> State {
        let (theta, x_dot, theta_dot) = (s[1], s[2], s[3]);
        let (sin, cos) = theta.sin_cos();
        let (g, m, l, ml, mass) = (self.g, self.m, self.l, self.ml, self.mass);
        let theta_dot2 = theta_dot * theta_dot;
        let cos2 = cos * cos;

        let x_ddot = (4.0 * u / 3.0 + 4.0 * ml * theta_dot2 * sin / 3.0
            - m * g * (2.0 * theta).sin() / 2.0)
            / (4.0 * mass - m * cos2);
        let theta_ddot = (mass * g * sin - ml * theta_dot2 * sin * cos - u * cos)
            / (4.0 * mass * l / 3.0 - ml * cos2);

        [x_dot, theta_dot, x_ddot, theta_ddot]
    }
}

fn euler(s: &State, s_dot: &State, dt: f64) -> State {
    let mut res = *s;
    for i in 0..res.len() {
        res[i] += s_dot[i] * dt;
    }
    res
}

/// Wraps an angle into `[-pi, pi)`.
pub fn normalize(theta: f64) -> f64 {
    (theta + 3.0 * PI) % (2.0 * PI) - PI
}
