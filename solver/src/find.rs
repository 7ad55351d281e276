use std::{collections::VecDeque, fmt::Debug, fmt::Display, time::Instant};

/// Supertrait that collects all the requirements on the NodeReference values
/// Must be copy, comparable and not references (hence 'static)
pub trait NodeReference: Copy + Eq + Debug + 'static {}

pub trait MapTrait {
    /// The type that can be used to reference nodes in the map
    type Reference: NodeReference;

    /// The type that the map uses for storage
    type Storage<T: Default + Copy + Clone + 'static>: MapStorage<T, Reference = Self::Reference>;

    /// Check if the provided node reference lies inside the map
    fn is_valid(&self, node: Self::Reference) -> bool;

    /// Check if the provided (valid) node can be walked on
    fn is_passable(&self, node: Self::Reference) -> bool;

    /// Return one entry per neighbor direction, in a fixed order. Directions that
    /// leave the map yield `None`.
    fn neighbors_of(
        &self,
        node: Self::Reference,
    ) -> impl Iterator<Item = Option<Self::Reference>>;

    /// Create a storage for values of type T
    fn create_storage<T: Default + Copy + Clone + 'static>(&self) -> Self::Storage<T>;
}

pub trait MapStorage<T> {
    type Reference: NodeReference;

    fn is_valid(&self, node: Self::Reference) -> bool;
    fn get(&self, node: Self::Reference) -> T;
    fn get_mut(&mut self, node: Self::Reference) -> &mut T;
}

/// Observes the progress of a [`PathFinder`].
pub trait Tracer<R> {
    /// A neighbor was accepted and appended to the frontier.
    fn on_enqueue(&mut self, _node: R) {}

    /// Called once for every enumerated neighbor, after the decision to enqueue
    /// it or not. `step` counts from zero over the whole search.
    fn on_candidate(&mut self, _step: usize) {}
}

impl<R> Tracer<R> for () {}

/// Search state of a single node
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Visited<R> {
    Unseen,
    /// Waiting in the frontier
    Queued { from: Option<R> },
    /// Dequeued and expanded
    Expanded { from: Option<R> },
}

impl<R> Default for Visited<R> {
    fn default() -> Self {
        Visited::Unseen
    }
}

impl<R: Copy> Visited<R> {
    /// The node this one was first reached from
    pub fn parent(&self) -> Option<R> {
        match self {
            Visited::Unseen => None,
            Visited::Queued { from } | Visited::Expanded { from } => *from,
        }
    }

    pub fn is_unseen(&self) -> bool {
        matches!(self, Visited::Unseen)
    }

    pub fn is_expanded(&self) -> bool {
        matches!(self, Visited::Expanded { .. })
    }
}

impl<R> Display for Visited<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Visited::Unseen => write!(f, " "),
            Visited::Queued { .. } => write!(f, "o"),
            Visited::Expanded { .. } => write!(f, "*"),
        }
    }
}

#[derive(Debug, PartialEq, Clone, Eq)]
pub struct PathResult<R> {
    pub path: Vec<R>,
    pub start: R,
    pub goal: R,
    /// Number of moves, one less than the number of nodes on the path
    pub hops: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathFinderState<R> {
    Computing,
    NoPathFound,
    /// The deadline passed before the search completed
    TimedOut,
    PathFound(PathResult<R>),
}

impl<R> PathFinderState<R> {
    pub fn is_done(&self) -> bool {
        !matches!(self, PathFinderState::Computing)
    }

    pub fn path(&self) -> Option<&[R]> {
        match self {
            PathFinderState::PathFound(result) => Some(&result.path),
            _ => None,
        }
    }
}

/// Breadth-first search from `start` to `goal` over an unweighted map.
///
/// The frontier is a FIFO of nodes; every node remembers the node that first
/// enqueued it, so the path returned is the one a queue of whole paths would
/// have produced. A node enters the frontier at most once.
#[derive(Debug)]
pub struct PathFinder<
    R: NodeReference,
    S: MapStorage<Visited<R>, Reference = R>,
    M: MapTrait<Reference = R, Storage<Visited<R>> = S>,
> {
    start: R,
    goal: R,
    visited: S,
    frontier: VecDeque<R>,
    state: PathFinderState<R>,
    deadline: Option<Instant>,
    steps: usize,
    expansions: usize,
    _map: std::marker::PhantomData<M>,
}

impl<
        R: NodeReference,
        S: MapStorage<Visited<R>, Reference = R>,
        M: MapTrait<Reference = R, Storage<Visited<R>> = S>,
    > PathFinder<R, S, M>
{
    pub fn new(start: R, goal: R, mut visited: S) -> Self {
        if visited.is_valid(start) {
            *visited.get_mut(start) = Visited::Queued { from: None };
        }

        Self {
            start,
            goal,
            visited,
            frontier: VecDeque::from([start]),
            state: PathFinderState::Computing,
            deadline: None,
            steps: 0,
            expansions: 0,
            _map: std::marker::PhantomData,
        }
    }

    /// Give up with [`PathFinderState::TimedOut`] once `deadline` has passed.
    /// Checked before every expansion.
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Run the search to completion
    pub fn finish<T: Tracer<R>>(&mut self, map: &M, tracer: &mut T) -> PathFinderState<R> {
        loop {
            match self.step(map, tracer) {
                PathFinderState::Computing => {}
                s => return s,
            }
        }
    }

    /// Expand a single node
    pub fn step<T: Tracer<R>>(&mut self, map: &M, tracer: &mut T) -> PathFinderState<R> {
        if self.state.is_done() {
            return self.state.clone();
        }

        if let Some(deadline) = self.deadline {
            if Instant::now() >= deadline {
                self.state = PathFinderState::TimedOut;
                return self.state.clone();
            }
        }

        let Some(node) = self.frontier.pop_front() else {
            self.state = PathFinderState::NoPathFound;
            return self.state.clone();
        };

        // neighbors are checked before they are enqueued, only the start can fail here
        if !map.is_valid(node) || !map.is_passable(node) {
            self.state = PathFinderState::NoPathFound;
            return self.state.clone();
        }

        let from = self.visited.get(node).parent();
        *self.visited.get_mut(node) = Visited::Expanded { from };
        self.expansions += 1;

        if node == self.goal {
            let path = self.backtrack(node);

            self.state = PathFinderState::PathFound(PathResult {
                hops: path.len() - 1,
                path,
                start: self.start,
                goal: self.goal,
            });

            return self.state.clone();
        }

        for neighbor in map.neighbors_of(node) {
            if let Some(next) = neighbor {
                if map.is_passable(next) && self.visited.get(next).is_unseen() {
                    *self.visited.get_mut(next) = Visited::Queued { from: Some(node) };
                    self.frontier.push_back(next);
                    tracer.on_enqueue(next);
                }
            }

            tracer.on_candidate(self.steps);
            self.steps += 1;
        }

        self.state.clone()
    }

    /// Follow the parent pointers from `node` back to the start
    fn backtrack(&self, node: R) -> Vec<R> {
        let mut path = vec![node];
        let mut current = node;

        while let Some(from) = self.visited.get(current).parent() {
            path.push(from);
            current = from;
        }

        path.reverse();
        path
    }

    pub fn state(&self) -> &PathFinderState<R> {
        &self.state
    }

    pub fn get_visited(&self) -> &S {
        &self.visited
    }

    pub fn into_visited(self) -> S {
        self.visited
    }

    pub fn start(&self) -> R {
        self.start
    }

    pub fn goal(&self) -> R {
        self.goal
    }

    /// Number of neighbors enumerated so far
    pub fn steps(&self) -> usize {
        self.steps
    }

    /// Number of nodes dequeued and expanded so far
    pub fn expansions(&self) -> usize {
        self.expansions
    }

    pub fn frontier_len(&self) -> usize {
        self.frontier.len()
    }
}

#[cfg(test)]
mod test {

    use super::*;
    use crate::grid::{Cell, CellStorage, GridMap, Point};
    use proptest::prelude::*;
    use std::collections::{HashSet, VecDeque};

    type Finder = PathFinder<Point, CellStorage<Visited<Point>>, GridMap>;

    fn create_basic_map() -> GridMap {
        "
        #######
        #.###.#
        #.###.#
        #.#...#
        #.#.###
        #......
        #######
        "
        .parse()
        .unwrap()
    }

    fn run(map: &GridMap, start: Point, goal: Point) -> (PathFinderState<Point>, Finder) {
        let mut finder = Finder::new(start, goal, map.create_storage());
        let state = finder.finish(map, &mut ());
        (state, finder)
    }

    /// Plain BFS distance table, used as the reference for the engine
    fn reference_distance(map: &GridMap, start: Point, goal: Point) -> Option<usize> {
        if !map.is_passable(start) {
            return None;
        }
        let mut dist = vec![usize::MAX; map.rows * map.columns];
        let mut queue = VecDeque::from([start]);
        dist[start.row * map.columns + start.col] = 0;

        while let Some(p) = queue.pop_front() {
            let d = dist[p.row * map.columns + p.col];
            if p == goal {
                return Some(d);
            }
            for q in map.neighbors_of(p).flatten() {
                let i = q.row * map.columns + q.col;
                if map.is_passable(q) && dist[i] == usize::MAX {
                    dist[i] = d + 1;
                    queue.push_back(q);
                }
            }
        }
        None
    }

    fn assert_valid_path(map: &GridMap, path: &[Point], start: Point, goal: Point) {
        assert_eq!(path.first(), Some(&start));
        assert_eq!(path.last(), Some(&goal));
        for pair in path.windows(2) {
            assert_eq!(pair[0].distance(&pair[1]), 1, "{:?} not adjacent", pair);
        }
        for p in path {
            assert_eq!(map.get(*p), Cell::Passable);
        }
        let unique: HashSet<_> = path.iter().collect();
        assert_eq!(unique.len(), path.len());
    }

    #[test]
    fn test_basic_route() {
        let map = create_basic_map();
        let start = Point { row: 1, col: 1 };
        let goal = Point { row: 1, col: 5 };

        let (state, _) = run(&map, start, goal);

        assert!(matches!(
            state,
            PathFinderState::PathFound(PathResult { hops: 12, .. })
        ));
        assert_valid_path(&map, state.path().unwrap(), start, goal);
    }

    #[test]
    fn test_basic_no_route() {
        let map = create_basic_map();

        // the goal is a wall
        let (state, _) = run(&map, Point { row: 1, col: 1 }, Point { row: 0, col: 5 });
        assert_eq!(state, PathFinderState::NoPathFound);
    }

    #[test]
    fn test_blocked_start() {
        let map = create_basic_map();

        let (state, finder) = run(&map, Point { row: 0, col: 0 }, Point { row: 0, col: 0 });
        assert_eq!(state, PathFinderState::NoPathFound);
        assert_eq!(finder.expansions(), 0);
    }

    #[test]
    fn test_start_is_goal() {
        let map = create_basic_map();
        let start = Point { row: 5, col: 3 };

        let (state, finder) = run(&map, start, start);
        assert_eq!(state.path(), Some(&[start][..]));
        assert!(matches!(
            state,
            PathFinderState::PathFound(PathResult { hops: 0, .. })
        ));
        assert_eq!(finder.steps(), 0);
    }

    #[test]
    fn test_wall_with_gap() {
        let map: GridMap = "
            ..#..
            ..#..
            ..#..
            ..#..
            .....
            "
        .parse()
        .unwrap();
        let start = Point::from_xy(0, 0);
        let goal = Point::from_xy(4, 0);

        let (state, _) = run(&map, start, goal);
        let path = state.path().unwrap();

        assert_eq!(path.len() - 1, 12);
        assert!(path.contains(&Point::from_xy(2, 4)));
        assert_valid_path(&map, path, start, goal);
    }

    #[test]
    fn test_full_wall_visits_reachable_component() {
        let map: GridMap = "
            ..#..
            ..#..
            ..#..
            ..#..
            ..#..
            "
        .parse()
        .unwrap();

        let (state, finder) = run(&map, Point::from_xy(0, 0), Point::from_xy(4, 0));
        assert_eq!(state, PathFinderState::NoPathFound);

        let expanded: HashSet<Point> = finder
            .get_visited()
            .iter()
            .filter(|(_, v)| v.is_expanded())
            .map(|(p, _)| p)
            .collect();
        let component: HashSet<Point> = (0..5)
            .flat_map(|y| (0..2).map(move |x| Point::from_xy(x, y)))
            .collect();

        assert_eq!(expanded, component);
        assert_eq!(finder.expansions(), component.len());
        // every expansion enumerates four directions
        assert_eq!(finder.steps(), 4 * component.len());
    }

    #[test]
    fn test_visited_map_text() {
        let map: GridMap = "
            ..#..
            ..#..
            ..#..
            ..#..
            ..#..
            "
        .parse()
        .unwrap();
        let goal = Point::from_xy(4, 0);

        let (_, finder) = run(&map, Point::from_xy(0, 0), goal);
        assert_eq!(finder.goal(), goal);
        assert_eq!(finder.frontier_len(), 0);
        assert_eq!(finder.get_visited().to_string(), "**   \n".repeat(5));

        // stop halfway, queued cells show up as well
        let mut finder = Finder::new(Point::from_xy(0, 0), goal, map.create_storage());
        finder.step(&map, &mut ());
        assert_eq!(finder.frontier_len(), 2);
        assert_eq!(
            finder.get_visited().to_string(),
            "*o   \no    \n     \n     \n     \n"
        );
    }

    #[test]
    fn test_tie_break_follows_neighbor_order() {
        // two equally short routes around the block, up/left is tried first
        let map: GridMap = "
            ...
            .#.
            ...
            "
        .parse()
        .unwrap();

        let (state, _) = run(&map, Point::from_xy(2, 2), Point::from_xy(0, 0));
        assert_eq!(
            state.path().unwrap(),
            &[
                Point::from_xy(2, 2),
                Point::from_xy(2, 1),
                Point::from_xy(2, 0),
                Point::from_xy(1, 0),
                Point::from_xy(0, 0),
            ]
        );
    }

    #[test]
    fn test_step_is_idempotent_when_done() {
        let map = create_basic_map();
        let (state, mut finder) = run(&map, Point { row: 1, col: 1 }, Point { row: 1, col: 5 });

        let expansions = finder.expansions();
        assert_eq!(finder.step(&map, &mut ()), state);
        assert_eq!(finder.expansions(), expansions);
    }

    #[test]
    fn test_deadline() {
        let map = GridMap::new(50, 50);
        let mut finder = Finder::new(
            Point::from_xy(0, 0),
            Point::from_xy(49, 49),
            map.create_storage(),
        )
        .with_deadline(Instant::now());

        assert_eq!(finder.finish(&map, &mut ()), PathFinderState::TimedOut);
        assert_eq!(finder.expansions(), 0);
        // the start is still waiting to be expanded
        assert_eq!(finder.frontier_len(), 1);
    }

    #[derive(Default)]
    struct CountingTracer {
        enqueued: Vec<Point>,
        candidates: Vec<usize>,
    }

    impl Tracer<Point> for CountingTracer {
        fn on_enqueue(&mut self, node: Point) {
            self.enqueued.push(node);
        }

        fn on_candidate(&mut self, step: usize) {
            self.candidates.push(step);
        }
    }

    #[test]
    fn test_tracer_sees_every_candidate() {
        let map = create_basic_map();
        let mut finder = Finder::new(
            Point { row: 1, col: 1 },
            Point { row: 1, col: 5 },
            map.create_storage(),
        );
        let mut tracer = CountingTracer::default();
        finder.finish(&map, &mut tracer);

        assert_eq!(tracer.candidates, (0..finder.steps()).collect::<Vec<_>>());

        let unique: HashSet<_> = tracer.enqueued.iter().collect();
        assert_eq!(unique.len(), tracer.enqueued.len());
        assert!(!tracer.enqueued.contains(&finder.start()));
    }

    fn arb_map() -> impl Strategy<Value = GridMap> {
        (1usize..8, 1usize..8).prop_flat_map(|(rows, columns)| {
            prop::collection::vec(prop::bool::weighted(0.7), rows * columns).prop_map(
                move |open| GridMap {
                    rows,
                    columns,
                    cells: open
                        .into_iter()
                        .map(|o| if o { Cell::Passable } else { Cell::Blocked })
                        .collect(),
                },
            )
        })
    }

    fn arb_case() -> impl Strategy<Value = (GridMap, Point, Point)> {
        arb_map().prop_flat_map(|map| {
            let (rows, columns) = (map.rows, map.columns);
            (
                Just(map),
                (0..rows, 0..columns).prop_map(|(row, col)| Point { row, col }),
                (0..rows, 0..columns).prop_map(|(row, col)| Point { row, col }),
            )
        })
    }

    proptest! {
        #[test]
        fn path_is_shortest_and_valid((map, start, goal) in arb_case()) {
            let (state, finder) = run(&map, start, goal);
            let expected = reference_distance(&map, start, goal);

            match state {
                PathFinderState::PathFound(result) => {
                    prop_assert_eq!(Some(result.hops), expected);
                    prop_assert_eq!(result.hops + 1, result.path.len());
                    assert_valid_path(&map, &result.path, start, goal);
                }
                PathFinderState::NoPathFound => prop_assert_eq!(expected, None),
                other => prop_assert!(false, "unexpected state {:?}", other),
            }

            prop_assert!(finder.expansions() <= map.rows * map.columns);
            prop_assert!(finder.steps() <= 4 * map.rows * map.columns);
        }
    }
}
