pub mod soldiers;

pub use soldiers::{
    CreateSoldierRequest, RankInput, SoldierFilter, SoldierQuery, SoldierResponse,
    UpdateSoldierRequest,
};
