use vass2_reach_lib::automaton::{
    cycle::Loop,
    lps::{
        LinearPathScheme,
        builder::{LPSBuilder, SearchBounds, build_schemes},
    },
    vass::{VASS2, counter::Vector2, initialized::InitializedVASS2},
};

fn v(x: i64, y: i64) -> Vector2 {
    Vector2::new(x, y)
}

fn test_data(name: &str) -> String {
    format!("{}/test_data/{}", env!("CARGO_MANIFEST_DIR"), name)
}

fn two_loops() -> InitializedVASS2 {
    InitializedVASS2::from_file(&test_data("two_loops.json")).unwrap()
}

#[test]
fn test_build_single_loop_scheme() {
    let ivass = InitializedVASS2::from_file(&test_data("guarded_loop.json")).unwrap();
    let schemes = build_schemes(&ivass.vass, 0, 2, 3, 3);

    assert_eq!(schemes.len(), 1);
    let scheme = &schemes[0];

    assert_eq!(scheme.prefix, vec![v(1, 0)]);
    assert_eq!(scheme.loops, vec![Loop::from_updates(vec![v(2, -1)]).unwrap()]);
    assert_eq!(scheme.loops[0].guard, v(0, 1));
    assert!(scheme.between.is_empty());
    assert_eq!(scheme.suffix, vec![v(0, 1)]);
    assert_eq!(scheme.path.as_ref().unwrap().states, vec![0, 1, 2]);
}

#[test]
fn test_build_schemes_with_between_segments() {
    let ivass = two_loops();
    let schemes = build_schemes(&ivass.vass, 0, 3, 5, 3);

    let paths = schemes
        .iter()
        .map(|s| s.path.as_ref().unwrap().states.clone())
        .collect::<Vec<_>>();
    assert_eq!(
        paths,
        vec![vec![0, 1, 2, 3], vec![0, 1, 3], vec![0, 2, 1, 3], vec![0, 2, 3]]
    );

    let scheme = &schemes[0];
    assert_eq!(scheme.prefix, vec![v(1, 1)]);
    assert_eq!(
        scheme
            .loops
            .iter()
            .map(|l| (l.effect, l.guard))
            .collect::<Vec<_>>(),
        vec![(v(2, -1), v(0, 1)), (v(1, 1), v(0, 0)), (v(-1, 2), v(1, 0))]
    );
    assert_eq!(scheme.between, vec![vec![], vec![v(0, 1)]]);
    assert_eq!(scheme.suffix, vec![v(0, 1)]);

    for scheme in &schemes {
        assert_eq!(scheme.between.len(), scheme.loops.len().saturating_sub(1));
        assert!(scheme.loops.len() <= 3);
    }
}

#[test]
fn test_build_schemes_loop_free() {
    let ivass = two_loops();

    for scheme in build_schemes(&ivass.vass, 0, 3, 5, 0) {
        assert!(scheme.is_linear());
        assert!(scheme.between.is_empty());
        assert!(scheme.suffix.is_empty());
        assert_eq!(scheme.prefix, scheme.path.as_ref().unwrap().updates);
    }

    let mut vass = VASS2::new();
    vass.add_transition(0, 1, v(1, 2));
    vass.add_transition(1, 2, v(-1, 0));

    let schemes = build_schemes(&vass, 0, 2, 2, 10);
    assert_eq!(schemes.len(), 1);
    let path = schemes[0].path.clone().unwrap();
    assert_eq!(
        schemes[0],
        LinearPathScheme::linear(vec![v(1, 2), v(-1, 0)]).with_path(path)
    );
}

#[test]
fn test_build_schemes_idempotent() {
    let ivass = two_loops();
    let bounds = SearchBounds::from_automaton(&ivass.vass);

    let mut builder = LPSBuilder::new(&ivass.vass, bounds);
    let first = builder.build(0, 3);
    let second = builder.build(0, 3);
    let fresh = LPSBuilder::new(&ivass.vass, bounds).build(0, 3);

    assert_eq!(first, second);
    assert_eq!(first, fresh);
}

#[test]
fn test_search_bounds_from_automaton() {
    let ivass = two_loops();
    assert_eq!(
        SearchBounds::from_automaton(&ivass.vass),
        SearchBounds::new(4, 32)
    );
    assert_eq!(
        SearchBounds::from_automaton(&VASS2::new()),
        SearchBounds::new(1, 1)
    );
}

#[test]
fn test_try_new_checks_between_segments() {
    let loops = vec![Loop::new(v(1, 0), v(0, 0)), Loop::new(v(0, 1), v(0, 0))];

    assert!(LinearPathScheme::try_new(vec![], loops.clone(), vec![], vec![]).is_err());
    assert!(LinearPathScheme::try_new(vec![], loops.clone(), vec![vec![], vec![]], vec![]).is_err());
    assert!(LinearPathScheme::try_new(vec![], loops, vec![vec![v(1, 1)]], vec![]).is_ok());
    assert!(LinearPathScheme::try_new(vec![v(1, 1)], vec![], vec![], vec![]).is_ok());
}

#[test]
#[should_panic]
fn test_new_panics_on_between_mismatch() {
    LinearPathScheme::new(vec![], vec![Loop::new(v(1, 0), v(0, 0))], vec![vec![]], vec![]);
}

#[test]
fn test_simulate() {
    let scheme = LinearPathScheme::new(
        vec![v(1, 0), v(1, 2)],
        vec![Loop::new(v(2, -1), v(1, 1)), Loop::new(v(-1, 2), v(0, 2))],
        vec![vec![v(0, 1), v(0, 2)]],
        vec![v(0, 1)],
    );

    // prefix (2, 2), loop 1 once (4, 1), between (4, 4), suffix (4, 5)
    assert_eq!(scheme.simulate(Vector2::ZERO, &[1, 0]), Some(v(4, 5)));
    // the second traversal is entered at (4, 1), which still covers the guard
    assert_eq!(scheme.simulate(Vector2::ZERO, &[2, 0]), Some(v(6, 4)));
    // a third traversal would be entered at (6, 0)
    assert_eq!(scheme.simulate(Vector2::ZERO, &[3, 0]), None);
    assert_eq!(scheme.simulate(Vector2::ZERO, &[0, 2]), Some(v(0, 10)));
    assert_eq!(scheme.simulate(Vector2::ZERO, &[0, 3]), None);

    assert_eq!(scheme.simulate(Vector2::ZERO, &[1]), None);
    assert_eq!(scheme.simulate(Vector2::ZERO, &[u64::MAX, 0]), None);
}

#[test]
fn test_simulate_between_fires_once() {
    let scheme = LinearPathScheme::new(
        vec![],
        vec![Loop::new(v(1, 0), v(0, 0)), Loop::new(v(0, 1), v(0, 0))],
        vec![vec![v(5, 5)]],
        vec![],
    );

    for (a, b) in [(0, 0), (1, 0), (0, 1), (3, 7)] {
        assert_eq!(
            scheme.simulate(Vector2::ZERO, &[a, b]),
            Some(v(5 + a as i64, 5 + b as i64))
        );
    }
}

#[test]
fn test_simulate_never_clamps() {
    let scheme = LinearPathScheme::new(
        vec![v(0, 1)],
        vec![Loop::new(v(-1, 0), v(1, 0))],
        vec![],
        vec![v(3, 0)],
    );

    // the loop can not be entered with x = 0, even though the suffix would
    // bring x back up
    assert_eq!(scheme.simulate(Vector2::ZERO, &[1]), None);
    assert_eq!(scheme.simulate(Vector2::ZERO, &[0]), Some(v(3, 1)));
    assert_eq!(scheme.simulate(v(2, 0), &[2]), Some(v(3, 1)));

    let negative_prefix = LinearPathScheme::linear(vec![v(-1, 0), v(2, 0)]);
    assert_eq!(negative_prefix.simulate(Vector2::ZERO, &[]), None);
    assert_eq!(negative_prefix.simulate(v(1, 0), &[]), Some(v(2, 0)));
}

#[test]
fn test_unfold() {
    let ivass = two_loops();
    let schemes = build_schemes(&ivass.vass, 0, 3, 5, 3);
    let scheme = &schemes[0];

    let trace = scheme.unfold(Vector2::ZERO, &[1, 2, 1]).unwrap();

    assert_eq!(
        trace,
        vec![
            v(0, 0),
            v(1, 1),
            // self-loop at 1
            v(3, 0),
            // cycle 1 -> 2 -> 1, twice
            v(3, 1),
            v(4, 1),
            v(4, 2),
            v(5, 2),
            // between segment 1 -> 2
            v(5, 3),
            // self-loop at 2
            v(4, 5),
            // suffix 2 -> 3
            v(4, 6),
        ]
    );
    assert_eq!(
        scheme.simulate(Vector2::ZERO, &[1, 2, 1]),
        trace.last().copied()
    );

    // a run that would need a negative counter
    assert_eq!(scheme.unfold(Vector2::ZERO, &[2, 0, 0]), None);
}

#[test]
fn test_fancy_string() {
    let scheme = LinearPathScheme::new(
        vec![v(1, 0)],
        vec![Loop::new(v(2, -1), v(0, 1)), Loop::new(v(0, 1), v(0, 0))],
        vec![vec![v(3, 3)]],
        vec![],
    );

    assert_eq!(
        scheme.to_fancy_string(),
        "[(1, 0)] (loop (2, -1) [guard (0, 1)])* [(3, 3)] (loop (0, 1) [guard (0, 0)])* []"
    );
}
