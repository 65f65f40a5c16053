/// Timing curve applied to a linear fraction in `[0, 1]`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Curve {
    Linear,
    EaseOut,
    EaseInOut,
    /// Spring settling within the animation duration.
    ///
    /// `damping` is the damping ratio: `1.0` is critically damped (no
    /// overshoot), lower values overshoot before settling.
    Spring { damping: f32 },
}

/// Natural frequency used for spring curves, in units of 1/duration.
const SPRING_OMEGA: f32 = 10.0;

impl Curve {
    /// Eased value for `t`. `t` is clamped; the result is exactly 0 at 0 and 1 at 1.
    pub fn ease(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        if t >= 1.0 {
            return 1.0;
        }
        match self {
            Curve::Linear => t,
            Curve::EaseOut => 1.0 - (1.0 - t) * (1.0 - t),
            Curve::EaseInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }
            Curve::Spring { damping } => spring(t, damping) / spring(1.0, damping),
        }
    }
}

fn spring(t: f32, damping: f32) -> f32 {
    let w = SPRING_OMEGA;
    let zeta = damping.clamp(0.05, 1.0);
    if zeta >= 1.0 {
        1.0 - (1.0 + w * t) * (-w * t).exp()
    } else {
        let wd = w * (1.0 - zeta * zeta).sqrt();
        let decay = (-zeta * w * t).exp();
        1.0 - decay * ((wd * t).cos() + (zeta * w / wd) * (wd * t).sin())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Curve; 5] = [
        Curve::Linear,
        Curve::EaseOut,
        Curve::EaseInOut,
        Curve::Spring { damping: 1.0 },
        Curve::Spring { damping: 0.8 },
    ];

    #[test]
    fn endpoints_are_exact() {
        for c in ALL {
            assert_eq!(c.ease(0.0), 0.0, "{c:?}");
            assert_eq!(c.ease(1.0), 1.0, "{c:?}");
            assert_eq!(c.ease(2.0), 1.0, "{c:?}");
        }
    }

    #[test]
    fn critically_damped_spring_is_monotonic() {
        let c = Curve::Spring { damping: 1.0 };
        let mut prev = 0.0;
        for i in 1..=20 {
            let v = c.ease(i as f32 / 20.0);
            assert!(v >= prev);
            prev = v;
        }
    }

    #[test]
    fn ease_out_leads_linear() {
        assert!(Curve::EaseOut.ease(0.3) > 0.3);
    }
}
