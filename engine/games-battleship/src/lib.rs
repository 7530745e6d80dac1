//! Battleship game engine for AlphaZero-style self-play.
//!
//! The board is a stack of six boolean planes, three per side:
//!
//! ```text
//! plane | polarity | meaning
//! ------+----------+-----------------------------------------------
//!   0   |    +1    | ship occupancy (fixed after placement)
//!   1   |    +1    | attempts fired by +1 (hit or miss)
//!   2   |    +1    | hits scored by +1 on -1's ships
//!   3   |    -1    | ship occupancy
//!   4   |    -1    | attempts fired by -1
//!   5   |    -1    | hits scored by -1 on +1's ships
//! ```
//!
//! Search and the oracle always reason from a *neutral* perspective in which
//! the side to move is [`Polarity::Positive`]. [`Battleship::flip_perspective`]
//! rewrites a state into that form.
//!
//! # Usage
//!
//! ```rust
//! use games_battleship::{Battleship, BoardConfig, Polarity};
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha20Rng;
//!
//! let game = Battleship::new(BoardConfig::new(5, vec![3, 2])).unwrap();
//! let mut rng = ChaCha20Rng::seed_from_u64(7);
//! let mut deployment = game.initialize(&mut rng, Polarity::Positive).unwrap();
//!
//! let shot = game
//!     .apply_action(&mut deployment.state, 12, Polarity::Positive)
//!     .unwrap();
//! println!("extra turn: {}", shot.extra_turn());
//! ```

use rand::seq::SliceRandom;
use rand_chacha::ChaCha20Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, trace};

/// Smallest board edge accepted by [`BoardConfig::validate`].
pub const MIN_BOARD_SIZE: usize = 3;

/// Number of channels produced by [`Battleship::encode_observation`].
pub const OBSERVATION_CHANNELS: usize = 4;

/// Whole-fleet placement attempts before giving up.
pub const DEFAULT_PLACEMENT_RETRIES: u32 = 32;

/// Errors raised by the game engine.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GameError {
    #[error("Invalid board configuration: {0}")]
    InvalidConfig(String),

    #[error("No collision-free placement for ship of length {length} after {attempts} attempts")]
    PlacementExhausted { length: usize, attempts: u32 },

    #[error("Action {action} is outside the {size}x{size} board")]
    ActionOutOfRange { action: usize, size: usize },

    #[error("Ship of length {length} at ({row}, {col}) is off the board or overlaps another ship")]
    PlacementBlocked { row: usize, col: usize, length: usize },

    #[error("Policy has {actual} entries, expected {expected}")]
    PolicyLength { expected: usize, actual: usize },

    #[error("Policy entry {index} is negative ({value})")]
    NegativeMass { index: usize, value: f32 },

    #[error("No legal probability mass left after masking")]
    ZeroLegalMass,
}

/// One of the two sides. `Positive` is +1, `Negative` is -1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Polarity {
    Positive,
    Negative,
}

impl Polarity {
    /// Numeric sign of this side (+1 or -1).
    pub fn sign(self) -> i8 {
        match self {
            Polarity::Positive => 1,
            Polarity::Negative => -1,
        }
    }

    pub fn opponent(self) -> Self {
        match self {
            Polarity::Positive => Polarity::Negative,
            Polarity::Negative => Polarity::Positive,
        }
    }

    /// Dense index (0 for +1, 1 for -1) for per-side arrays.
    pub fn index(self) -> usize {
        match self {
            Polarity::Positive => 0,
            Polarity::Negative => 1,
        }
    }

    fn plane_offset(self) -> usize {
        self.index() * 3
    }
}

impl std::fmt::Display for Polarity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:+}", self.sign())
    }
}

/// The three planes each side owns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Plane {
    Ships = 0,
    Attempts = 1,
    Hits = 2,
}

/// Six-plane board state. See the crate docs for the layout.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BoardState {
    size: usize,
    planes: [Vec<bool>; 6],
}

impl BoardState {
    /// Create an empty board (no ships, no shots).
    pub fn new(size: usize) -> Self {
        Self {
            size,
            planes: std::array::from_fn(|_| vec![false; size * size]),
        }
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    pub fn num_cells(&self) -> usize {
        self.size * self.size
    }

    #[inline]
    fn plane_index(polarity: Polarity, plane: Plane) -> usize {
        polarity.plane_offset() + plane as usize
    }

    /// Row-major view of one plane.
    pub fn plane(&self, polarity: Polarity, plane: Plane) -> &[bool] {
        &self.planes[Self::plane_index(polarity, plane)]
    }

    fn plane_mut(&mut self, polarity: Polarity, plane: Plane) -> &mut [bool] {
        &mut self.planes[Self::plane_index(polarity, plane)]
    }

    #[inline]
    pub fn get(&self, polarity: Polarity, plane: Plane, row: usize, col: usize) -> bool {
        self.plane(polarity, plane)[row * self.size + col]
    }

    #[inline]
    fn set(&mut self, polarity: Polarity, plane: Plane, row: usize, col: usize) {
        let size = self.size;
        self.plane_mut(polarity, plane)[row * size + col] = true;
    }

    /// Number of set cells in one plane.
    pub fn count(&self, polarity: Polarity, plane: Plane) -> usize {
        self.plane(polarity, plane).iter().filter(|&&cell| cell).count()
    }

    /// Cells of `attacker`'s hits that lie on the opponent's ships.
    pub fn confirmed_hits(&self, attacker: Polarity) -> usize {
        self.plane(attacker, Plane::Hits)
            .iter()
            .zip(self.plane(attacker.opponent(), Plane::Ships))
            .filter(|(&hit, &ship)| hit && ship)
            .count()
    }

    /// Swap the two triples so that each side sees itself as the other.
    pub fn flipped(&self) -> Self {
        let mut state = self.clone();
        state.swap_sides();
        state
    }

    fn swap_sides(&mut self) {
        for i in 0..3 {
            self.planes.swap(i, i + 3);
        }
    }

    /// Text view of what `polarity` knows about the opponent's waters.
    ///
    /// `.` unknown, `o` miss, `X` hit. Intended for debug logs.
    pub fn render(&self, polarity: Polarity) -> String {
        let mut out = String::with_capacity(self.num_cells() * 2 + self.size);
        for row in 0..self.size {
            for col in 0..self.size {
                let symbol = if self.get(polarity, Plane::Hits, row, col) {
                    'X'
                } else if self.get(polarity, Plane::Attempts, row, col) {
                    'o'
                } else {
                    '.'
                };
                out.push(symbol);
                if col + 1 < self.size {
                    out.push(' ');
                }
            }
            out.push('\n');
        }
        out
    }
}

/// Ship orientation on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Horizontal,
    Vertical,
}

/// A placed ship: contiguous cells in a single row or column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ship {
    cells: Vec<(usize, usize)>,
    orientation: Orientation,
}

impl Ship {
    fn new(row: usize, col: usize, length: usize, orientation: Orientation) -> Self {
        let cells = (0..length)
            .map(|i| match orientation {
                Orientation::Horizontal => (row, col + i),
                Orientation::Vertical => (row + i, col),
            })
            .collect();
        Self { cells, orientation }
    }

    pub fn cells(&self) -> &[(usize, usize)] {
        &self.cells
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// True once the opponent of `owner` has hit every cell of this ship.
    pub fn is_sunk(&self, state: &BoardState, owner: Polarity) -> bool {
        self.cells
            .iter()
            .all(|&(row, col)| state.get(owner.opponent(), Plane::Hits, row, col))
    }
}

/// Number of ships in `fleet` (owned by `owner`) that are fully hit.
pub fn sunk_ships(state: &BoardState, fleet: &[Ship], owner: Polarity) -> usize {
    fleet.iter().filter(|ship| ship.is_sunk(state, owner)).count()
}

/// Board dimensions and fleet composition (identical for both sides).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardConfig {
    pub size: usize,
    pub ship_lengths: Vec<usize>,
    pub placement_retries: u32,
}

impl BoardConfig {
    pub fn new(size: usize, ship_lengths: Vec<usize>) -> Self {
        Self {
            size,
            ship_lengths,
            placement_retries: DEFAULT_PLACEMENT_RETRIES,
        }
    }

    /// Builder pattern: set the number of whole-fleet placement attempts.
    pub fn with_placement_retries(mut self, retries: u32) -> Self {
        self.placement_retries = retries;
        self
    }

    pub fn num_actions(&self) -> usize {
        self.size * self.size
    }

    pub fn total_ship_cells(&self) -> usize {
        self.ship_lengths.iter().sum()
    }

    pub fn validate(&self) -> Result<(), GameError> {
        if self.size < MIN_BOARD_SIZE {
            return Err(GameError::InvalidConfig(format!(
                "board size {} is below the minimum of {}",
                self.size, MIN_BOARD_SIZE
            )));
        }
        if self.ship_lengths.is_empty() {
            return Err(GameError::InvalidConfig(
                "at least one ship is required".to_string(),
            ));
        }
        if let Some(&length) = self
            .ship_lengths
            .iter()
            .find(|&&len| len == 0 || len > self.size)
        {
            return Err(GameError::InvalidConfig(format!(
                "ship length {} does not fit a {}x{} board",
                length, self.size, self.size
            )));
        }
        if self.total_ship_cells() > self.num_actions() {
            return Err(GameError::InvalidConfig(format!(
                "fleet of {} cells exceeds the {} cells of the board",
                self.total_ship_cells(),
                self.num_actions()
            )));
        }
        if self.placement_retries == 0 {
            return Err(GameError::InvalidConfig(
                "placement_retries must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self::new(5, vec![3, 2])
    }
}

/// Result of firing at a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shot {
    /// Open water; the turn passes.
    Miss,
    /// An opponent ship cell; the shooter acts again.
    Hit,
    /// The cell had already been attempted; nothing changed.
    Repeat,
}

impl Shot {
    #[inline]
    pub fn extra_turn(self) -> bool {
        self == Shot::Hit
    }
}

/// Output of [`Battleship::is_terminal`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Termination {
    /// +1.0 when some side has won, 0.0 otherwise.
    pub value: f32,
    pub is_terminal: bool,
}

/// A freshly initialized game: the board plus each side's ships.
#[derive(Debug, Clone)]
pub struct Deployment {
    pub state: BoardState,
    fleets: [Vec<Ship>; 2],
}

impl Deployment {
    pub fn fleet(&self, polarity: Polarity) -> &[Ship] {
        &self.fleets[polarity.index()]
    }
}

/// Channels-first `[4, size, size]` observation tensor.
///
/// Channel order: opponent attempts, opponent hits, own attempts, own hits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    size: usize,
    data: Vec<f32>,
}

impl Observation {
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn shape(&self) -> [usize; 3] {
        [OBSERVATION_CHANNELS, self.size, self.size]
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    pub fn into_vec(self) -> Vec<f32> {
        self.data
    }

    pub fn channel(&self, channel: usize) -> &[f32] {
        let cells = self.size * self.size;
        &self.data[channel * cells..(channel + 1) * cells]
    }
}

/// The Battleship rules engine. Stateless apart from its configuration.
#[derive(Debug, Clone)]
pub struct Battleship {
    config: BoardConfig,
}

impl Battleship {
    /// Create an engine, rejecting configurations that cannot hold the fleet.
    pub fn new(config: BoardConfig) -> Result<Self, GameError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &BoardConfig {
        &self.config
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.config.size
    }

    #[inline]
    pub fn num_actions(&self) -> usize {
        self.config.num_actions()
    }

    /// Allocate a board and place both fleets, `starting` first.
    pub fn initialize(
        &self,
        rng: &mut ChaCha20Rng,
        starting: Polarity,
    ) -> Result<Deployment, GameError> {
        let mut state = BoardState::new(self.size());
        let first = self.place_fleet(&mut state, starting, rng)?;
        let second = self.place_fleet(&mut state, starting.opponent(), rng)?;

        let mut fleets: [Vec<Ship>; 2] = [Vec::new(), Vec::new()];
        fleets[starting.index()] = first;
        fleets[starting.opponent().index()] = second;

        debug!(
            size = self.size(),
            ships = self.config.ship_lengths.len(),
            "Fleets placed"
        );
        Ok(Deployment { state, fleets })
    }

    /// Place the whole fleet for `owner`, restarting from an empty grid when a
    /// ship has nowhere to go.
    fn place_fleet(
        &self,
        state: &mut BoardState,
        owner: Polarity,
        rng: &mut ChaCha20Rng,
    ) -> Result<Vec<Ship>, GameError> {
        let attempts = self.config.placement_retries;
        let mut blocked = 0;

        for attempt in 1..=attempts {
            state.plane_mut(owner, Plane::Ships).fill(false);
            match self.try_place_fleet(state, owner, rng) {
                Ok(fleet) => return Ok(fleet),
                Err(length) => {
                    blocked = length;
                    trace!(%owner, attempt, length, "Fleet placement blocked, retrying");
                }
            }
        }

        state.plane_mut(owner, Plane::Ships).fill(false);
        Err(GameError::PlacementExhausted {
            length: blocked,
            attempts,
        })
    }

    /// One placement pass. Returns the length of the first ship that could not
    /// be placed.
    fn try_place_fleet(
        &self,
        state: &mut BoardState,
        owner: Polarity,
        rng: &mut ChaCha20Rng,
    ) -> Result<Vec<Ship>, usize> {
        let mut fleet = Vec::with_capacity(self.config.ship_lengths.len());
        for &length in &self.config.ship_lengths {
            let candidates = self.candidate_placements(state, owner, length);
            let ship = candidates.choose(rng).cloned().ok_or(length)?;
            for &(row, col) in ship.cells() {
                state.set(owner, Plane::Ships, row, col);
            }
            fleet.push(ship);
        }
        Ok(fleet)
    }

    /// Every collision-free placement of a ship of `length` for `owner`.
    fn candidate_placements(&self, state: &BoardState, owner: Polarity, length: usize) -> Vec<Ship> {
        let size = self.size();
        let orientations: &[Orientation] = if length == 1 {
            // Both orientations describe the same single cell.
            &[Orientation::Horizontal]
        } else {
            &[Orientation::Horizontal, Orientation::Vertical]
        };

        let mut candidates = Vec::new();
        for &orientation in orientations {
            let (rows, cols) = match orientation {
                Orientation::Horizontal => (size, size + 1 - length),
                Orientation::Vertical => (size + 1 - length, size),
            };
            for row in 0..rows {
                for col in 0..cols {
                    let ship = Ship::new(row, col, length, orientation);
                    let free = ship
                        .cells()
                        .iter()
                        .all(|&(r, c)| !state.get(owner, Plane::Ships, r, c));
                    if free {
                        candidates.push(ship);
                    }
                }
            }
        }
        candidates
    }

    /// Place a single ship by hand, e.g. for scripted positions.
    ///
    /// Fails without touching `state` when the ship leaves the board or
    /// overlaps one of `owner`'s ships.
    pub fn place_ship(
        &self,
        state: &mut BoardState,
        owner: Polarity,
        row: usize,
        col: usize,
        length: usize,
        orientation: Orientation,
    ) -> Result<Ship, GameError> {
        let blocked = GameError::PlacementBlocked { row, col, length };
        let size = self.size();
        let (end_row, end_col) = match orientation {
            Orientation::Horizontal => (row, col + length),
            Orientation::Vertical => (row + length, col),
        };
        let fits = match orientation {
            Orientation::Horizontal => row < size && end_col <= size,
            Orientation::Vertical => col < size && end_row <= size,
        };
        if length == 0 || !fits {
            return Err(blocked);
        }

        let ship = Ship::new(row, col, length, orientation);
        if ship
            .cells()
            .iter()
            .any(|&(r, c)| state.get(owner, Plane::Ships, r, c))
        {
            return Err(blocked);
        }
        for &(r, c) in ship.cells() {
            state.set(owner, Plane::Ships, r, c);
        }
        Ok(ship)
    }

    /// Decode a flat action index into `(row, col)`.
    pub fn decode_action(&self, action: usize) -> Result<(usize, usize), GameError> {
        if action >= self.num_actions() {
            return Err(GameError::ActionOutOfRange {
                action,
                size: self.size(),
            });
        }
        Ok((action / self.size(), action % self.size()))
    }

    /// Fire at `action` as `polarity`.
    ///
    /// A hit grants the shooter another action ([`Shot::extra_turn`]). Firing
    /// at an already attempted cell leaves the state untouched.
    pub fn apply_action(
        &self,
        state: &mut BoardState,
        action: usize,
        polarity: Polarity,
    ) -> Result<Shot, GameError> {
        let (row, col) = self.decode_action(action)?;

        let attempted = state.get(polarity, Plane::Attempts, row, col);
        let ship = state.get(polarity.opponent(), Plane::Ships, row, col);

        let shot = match (attempted, ship) {
            (true, _) => Shot::Repeat,
            (false, false) => {
                state.set(polarity, Plane::Attempts, row, col);
                Shot::Miss
            }
            (false, true) => {
                state.set(polarity, Plane::Attempts, row, col);
                state.set(polarity, Plane::Hits, row, col);
                Shot::Hit
            }
        };

        trace!(%polarity, action, row, col, ?shot, "Shot resolved");
        Ok(shot)
    }

    /// Cells `polarity` has not fired at yet, row-major.
    pub fn legal_actions(&self, state: &BoardState, polarity: Polarity) -> Vec<usize> {
        state
            .plane(polarity, Plane::Attempts)
            .iter()
            .enumerate()
            .filter(|(_, &attempted)| !attempted)
            .map(|(action, _)| action)
            .collect()
    }

    /// Dense legality mask: `true` where `polarity` may still fire.
    pub fn legal_mask(&self, state: &BoardState, polarity: Polarity) -> Vec<bool> {
        state
            .plane(polarity, Plane::Attempts)
            .iter()
            .map(|&attempted| !attempted)
            .collect()
    }

    pub fn legal_moves_count(&self, state: &BoardState, polarity: Polarity) -> usize {
        state.num_cells() - state.count(polarity, Plane::Attempts)
    }

    /// Zero the mass on cells the neutral mover (+1) has already attempted and
    /// renormalize to sum 1. Every entry must be non-negative, attempted cells
    /// included.
    pub fn mask_and_renormalize(
        &self,
        policy: &[f32],
        state: &BoardState,
    ) -> Result<Vec<f32>, GameError> {
        if policy.len() != self.num_actions() {
            return Err(GameError::PolicyLength {
                expected: self.num_actions(),
                actual: policy.len(),
            });
        }
        if let Some((index, &value)) = policy.iter().enumerate().find(|(_, p)| **p < 0.0) {
            return Err(GameError::NegativeMass { index, value });
        }

        let attempts = state.plane(Polarity::Positive, Plane::Attempts);
        let mut masked: Vec<f32> = policy
            .iter()
            .zip(attempts)
            .map(|(&p, &attempted)| if attempted { 0.0 } else { p })
            .collect();

        let total: f32 = masked.iter().sum();
        if !(total > 0.0 && total.is_finite()) {
            return Err(GameError::ZeroLegalMass);
        }
        for p in &mut masked {
            *p /= total;
        }
        Ok(masked)
    }

    /// The side that has hit every opponent ship cell, checking +1 first.
    pub fn winner(&self, state: &BoardState) -> Option<Polarity> {
        [Polarity::Positive, Polarity::Negative]
            .into_iter()
            .find(|&attacker| {
                let targets = state.count(attacker.opponent(), Plane::Ships);
                targets > 0 && state.confirmed_hits(attacker) == targets
            })
    }

    pub fn is_terminal(&self, state: &BoardState) -> Termination {
        match self.winner(state) {
            Some(_) => Termination {
                value: 1.0,
                is_terminal: true,
            },
            None => Termination {
                value: 0.0,
                is_terminal: false,
            },
        }
    }

    /// Rewrite `state` so that `polarity` becomes the +1 side.
    pub fn flip_perspective(&self, mut state: BoardState, polarity: Polarity) -> BoardState {
        if polarity == Polarity::Negative {
            state.swap_sides();
        }
        state
    }

    /// Encode what the neutral mover has observed. Ship positions are never
    /// included.
    pub fn encode_observation(&self, state: &BoardState) -> Observation {
        let me = Polarity::Positive;
        let them = Polarity::Negative;
        let channels = [
            state.plane(them, Plane::Attempts),
            state.plane(them, Plane::Hits),
            state.plane(me, Plane::Attempts),
            state.plane(me, Plane::Hits),
        ];

        let mut data = Vec::with_capacity(OBSERVATION_CHANNELS * state.num_cells());
        for channel in channels {
            data.extend(channel.iter().map(|&cell| if cell { 1.0 } else { 0.0 }));
        }

        Observation {
            size: state.size(),
            data,
        }
    }
}
