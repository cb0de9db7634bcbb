use thiserror::Error;

/// The result of attempting to perform an invalid action on a [Game] or [Session].
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    #[error("invalid combination of game options")]
    InvalidGameOptions,
    #[error("please enter the player's name")]
    EmptyName,
    #[error("please choose a color for the player")]
    MissingColor,
    #[error("this color is already taken by another player")]
    ColorTaken,
    #[error("the roster is full")]
    RosterFull,
    #[error("at least 2 players required")]
    TooFewPlayers,
    #[error("no player was selected")]
    NoTargetSelected,
    #[error("a level must be selected before the game can start")]
    LevelNotSelected,
    #[error("levels are not enabled for this game")]
    LevelsDisabled,
    #[error("no player exists with the given id")]
    PlayerNotFound,
    #[error("no situation exists with the given label")]
    UnknownSituation,
    #[error("this action cannot be performed during this phase of the game")]
    InvalidAction,
    #[error("game does not exist")]
    GameNotFound,
    #[error("not connected to a game")]
    NotInGame,
}
