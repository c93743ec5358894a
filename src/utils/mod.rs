pub mod time;

const ID_LEN: usize = 21;

/// Generate a unique identifier for nodes, edges and runs.
pub fn longid() -> String {
    nanoid::nanoid!(ID_LEN)
}
