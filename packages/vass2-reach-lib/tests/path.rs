use vass2_reach_lib::automaton::{
    path::find_simple_paths,
    vass::{VASS2, counter::Vector2},
};

fn vass_from(transitions: &[(u32, u32, (i64, i64))]) -> VASS2 {
    let mut vass = VASS2::new();
    for &(from, to, update) in transitions {
        vass.add_transition(from, to, update.into());
    }
    vass
}

fn branching_vass() -> VASS2 {
    vass_from(&[
        (0, 1, (1, 0)),
        (0, 2, (2, -1)),
        (1, 2, (-1, 2)),
        (1, 3, (0, 1)),
        (2, 3, (3, 0)),
        (3, 3, (1, -3)),
        (3, 0, (2, -1)),
    ])
}

fn states_of(vass: &VASS2, start: u32, end: u32, max_length: usize) -> Vec<Vec<u32>> {
    find_simple_paths(vass, start, end, max_length)
        .into_iter()
        .map(|p| p.states)
        .collect()
}

#[test]
fn test_simple_paths() {
    let vass = branching_vass();

    assert_eq!(
        states_of(&vass, 0, 3, 4),
        vec![vec![0, 1, 2, 3], vec![0, 1, 3], vec![0, 2, 3]]
    );
    assert_eq!(states_of(&vass, 0, 3, 2), vec![vec![0, 1, 3], vec![0, 2, 3]]);
    assert!(states_of(&vass, 0, 3, 1).is_empty());
    assert!(states_of(&vass, 3, 4, 4).is_empty());
}

#[test]
fn test_simple_paths_same_start_and_end() {
    let vass = branching_vass();
    let paths = find_simple_paths(&vass, 1, 1, 3);

    assert_eq!(paths.len(), 1);
    assert_eq!(paths[0].states, vec![1]);
    assert!(paths[0].is_empty());
    assert_eq!(paths[0].effect(), Some(Vector2::ZERO));

    // even a length limit of zero admits the empty path
    assert_eq!(find_simple_paths(&vass, 1, 1, 0).len(), 1);
}

#[test]
fn test_simple_paths_updates() {
    let vass = branching_vass();
    let paths = find_simple_paths(&vass, 0, 3, 4);

    assert_eq!(
        paths[0].updates,
        vec![Vector2::new(1, 0), Vector2::new(-1, 2), Vector2::new(3, 0)]
    );
    assert_eq!(paths[0].effect(), Some(Vector2::new(3, 2)));
    assert_eq!(paths[0].to_fancy_string(), "0 -(1, 0)-> 1 -(-1, 2)-> 2 -(3, 0)-> 3");
}

#[test]
fn test_simple_paths_ignore_back_edges() {
    let vass = vass_from(&[
        (0, 1, (1, 0)),
        (0, 2, (2, -1)),
        (1, 0, (-1, 0)),
        (1, 3, (0, 1)),
        (2, 3, (3, 0)),
    ]);

    for max_length in [4, 6] {
        assert_eq!(
            states_of(&vass, 0, 3, max_length),
            vec![vec![0, 1, 3], vec![0, 2, 3]]
        );
    }
}

#[test]
fn test_simple_paths_parallel_transitions() {
    let vass = vass_from(&[(0, 1, (1, 0)), (0, 1, (0, 1)), (1, 2, (0, 0))]);
    let paths = find_simple_paths(&vass, 0, 2, 5);

    assert_eq!(paths.len(), 2);
    assert_eq!(paths[0].states, paths[1].states);
    assert_eq!(paths[0].updates[0], Vector2::new(1, 0));
    assert_eq!(paths[1].updates[0], Vector2::new(0, 1));
}

#[test]
fn test_simple_paths_are_simple() {
    let mut vass = VASS2::new();
    for from in 0..5u32 {
        for to in 0..5u32 {
            vass.add_transition(from, to, Vector2::new(from as i64, -(to as i64)));
        }
    }

    for max_length in 0..6 {
        let paths = find_simple_paths(&vass, 0, 4, max_length);

        for path in &paths {
            assert!(!path.has_repeated_state());
            assert!(path.len() <= max_length);
            assert_eq!(path.states.len(), path.updates.len() + 1);
            assert_eq!(path.start(), 0);
            assert_eq!(path.end(), 4);
        }
    }

    // 1 + 3 + 3 * 2 + 3 * 2 * 1 paths through the three inner states
    assert_eq!(find_simple_paths(&vass, 0, 4, 5).len(), 16);
}
