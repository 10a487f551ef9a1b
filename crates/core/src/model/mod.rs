mod ids;
mod player;
mod question;
mod round;
mod session;

pub use ids::{ParseIdError, PlayerId, SessionId};
pub use player::{GameResult, Player, PlayerError, PlayerName, PlayerStats};
pub use question::{Expression, OPTION_COUNT, Operator, Question, QuestionError};
pub use round::{Round, RoundError};
pub use session::{GamePhase, GameSession, RoundRecord};
