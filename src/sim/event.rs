/// Events emitted during a simulation step.
/// The host consumes these for feedback, flag state and result submission.

#[derive(Clone, Debug, PartialEq)]
pub enum GameEvent {
    Jumped,
    CoinCollected { index: usize, total: u32 },
    CheckpointReached { time: f32 },
    /// A block came to rest on the primary hole's floor.
    BlockSettledInHole { index: usize },
    LifeLost { remaining: u32 },
    GameOver { coins: u32 },
    LevelCompleted {
        elapsed: f32,
        checkpoint_time: Option<f32>,
        coins: u32,
        stars: u8,
    },
}
