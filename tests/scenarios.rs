use pidf_control as pc;

fn timing() -> pc::Timing {
    pc::Timing::new(0.01, 0.05).unwrap()
}

#[test]
fn proportional_step_kicks_then_decays() {
    let pidf = pc::Pidf::new(timing(), [pc::Gains::new(1.0, 0.0, 0.0)]);
    let mut w = pc::Window::at_rest();

    let ys: Vec<f64> = (0..400).map(|_| pidf.tick(&mut w, [1.0])[0]).collect();
    assert!((ys[0] - 1.0).abs() < 1e-12, "y0 = {}", ys[0]);
    assert!((ys[1] - 1.0).abs() < 1e-12, "y1 = {}", ys[1]);
    assert!(ys[2] < 1.0);
    assert!(ys[399].abs() < 1e-9, "y399 = {}", ys[399]);
}

#[test]
fn caller_owned_buffers_match_window_loop() {
    // Runtime channel count with Vec buffers shifted by hand, against the
    // fixed-size window doing the same thing.
    const N: usize = 4;
    let kp = vec![1.0, 0.5, 2.0, 0.0];
    let ki = vec![0.0, 1.5, 0.3, 4.0];
    let kd = vec![0.02, 0.0, 0.1, 0.01];

    let mut x_prev = vec![0.0; N];
    let mut x = vec![0.0; N];
    let mut y_prev = vec![0.0; N];
    let mut y = vec![0.0; N];
    let mut y_next = vec![0.0; N];

    let gains: [pc::Gains; N] = core::array::from_fn(|i| pc::Gains::new(kp[i], ki[i], kd[i]));
    let pidf = pc::Pidf::new(timing(), gains);
    let mut w = pc::Window::<N>::at_rest();

    for k in 0..200 {
        let input: [f64; N] = core::array::from_fn(|i| ((k + i) as f64 * 0.1).sin());
        let x_next = input.to_vec();

        pc::evaluate(
            0.01,
            0.05,
            &pc::GainSlices {
                kp: &kp,
                ki: &ki,
                kd: &kd,
            },
            &pc::HistorySlices {
                x_prev: &x_prev,
                x: &x,
                x_next: &x_next,
                y_prev: &y_prev,
                y: &y,
            },
            &mut y_next,
        )
        .unwrap();

        let expected = pidf.tick(&mut w, input);
        assert_eq!(y_next, expected.to_vec(), "tick {k}");

        x_prev = std::mem::replace(&mut x, x_next);
        y_prev = std::mem::replace(&mut y, y_next.clone());
    }
}

#[test]
fn load_disturbance_settles_at_loop_gain_equilibrium() {
    let seconds = 40.0;
    let mut cfg = pc::LoopConfig::<3>::new(timing(), 7);
    cfg.channels[0].setpoint = 0.5;
    cfg.channels[1].setpoint = -0.25;
    cfg.channels[2].setpoint = 1.0;
    pc::Scenario::Disturbance.configure(&mut cfg);

    let mut lp = pc::ClosedLoop::new(&cfg);
    let steps = (seconds / 0.01) as usize;
    let mut last = None;
    for _ in 0..steps {
        last = Some(lp.tick());
        pc::Scenario::Disturbance.update(&mut lp, seconds);
    }

    // Unit plant gain, controller DC gain 4 K_i T_s.
    let c = 4.0 * cfg.channels[0].gains.ki * 0.01;
    let s = last.unwrap();
    for i in 0..3 {
        let load = lp.plants()[i].load;
        assert_eq!(load, -0.3);
        let expected = (c * s.setpoint[i] + load) / (1.0 + c);
        assert!(
            (s.plant[i] - expected).abs() < 1e-6,
            "axis {i}: plant {} vs {expected}",
            s.plant[i]
        );
    }
}

#[test]
fn derivative_filter_smooths_noisy_measurement() {
    let roughness = |tf: f64| {
        let mut cfg = pc::LoopConfig::<1>::new(pc::Timing::new(0.01, tf).unwrap(), 3);
        cfg.channels[0].gains = pc::Gains::new(1.0, 1.0, 0.05);
        pc::Scenario::Noisy.configure(&mut cfg);

        let mut lp = pc::ClosedLoop::new(&cfg);
        let mut prev = 0.0;
        let mut acc = 0.0;
        for k in 0..3000 {
            let u = lp.tick().output[0];
            if k >= 1000 {
                acc += (u - prev) * (u - prev);
            }
            prev = u;
        }
        acc
    };

    // Nyquist gain of the derivative path is 16 K_d/(16 T_f + T_s):
    // about 4.7 against 0.5.
    let light = roughness(0.01);
    let heavy = roughness(0.1);
    assert!(light.is_finite() && heavy.is_finite());
    assert!(heavy < light, "T_f=0.1: {heavy} vs T_f=0.01: {light}");
}

#[test]
fn invalid_timing_is_rejected_before_evaluation() {
    let one = [1.0];
    let gains = pc::GainSlices {
        kp: &one,
        ki: &one,
        kd: &one,
    };
    let history = pc::HistorySlices {
        x_prev: &one,
        x: &one,
        x_next: &one,
        y_prev: &one,
        y: &one,
    };
    let mut y_next = [0.0];

    assert!(matches!(
        pc::evaluate(0.0, 0.05, &gains, &history, &mut y_next),
        Err(pc::PidfError::InvalidParameter { name: "T_s", .. })
    ));
    assert!(matches!(
        pc::evaluate(0.01, -1.0, &gains, &history, &mut y_next),
        Err(pc::PidfError::InvalidParameter { name: "T_f", .. })
    ));
}
