//! Benchmark utilities.

use memdb_core::Database;
use rand::Rng;

/// Generate `count` distinct keys.
pub fn generate_keys(count: usize) -> Vec<String> {
    (0..count).map(|i| format!("key{i}")).collect()
}

/// Generate `count` values drawn from `distinct` different ones.
pub fn random_values(count: usize, distinct: usize) -> Vec<String> {
    let mut rng = rand::thread_rng();
    (0..count)
        .map(|_| format!("v{}", rng.gen_range(0..distinct.max(1))))
        .collect()
}

/// Create a database holding `count` keys with values from `distinct`
/// different ones.
pub fn populated_database(count: usize, distinct: usize) -> Database {
    let db = Database::new();
    for (key, value) in generate_keys(count).into_iter().zip(random_values(count, distinct)) {
        db.set(key, value);
    }
    db
}

/// Open `depth` nested transactions on `db`, each writing one key, and
/// return the innermost.
pub fn nested_chain(db: &Database, depth: usize) -> Database {
    let mut scope = db.clone();
    for level in 0..depth {
        scope = scope.begin();
        scope.set(format!("level{level}"), level.to_string());
    }
    scope
}

/// Build a protocol script of `count` mixed commands.
pub fn random_script(count: usize, keys: usize) -> String {
    let mut rng = rand::thread_rng();
    let mut script = String::new();
    let mut depth = 0usize;
    for _ in 0..count {
        let key = rng.gen_range(0..keys.max(1));
        let line = match rng.gen_range(0..10) {
            0..=3 => format!("SET k{key} v{}", rng.gen_range(0..8)),
            4..=5 => format!("GET k{key}"),
            6 => format!("UNSET k{key}"),
            7 => format!("NUMEQUALTO v{}", rng.gen_range(0..8)),
            8 => {
                depth += 1;
                "BEGIN".to_owned()
            }
            _ if depth > 0 && rng.gen_bool(0.5) => {
                depth -= 1;
                "ROLLBACK".to_owned()
            }
            _ => {
                depth = 0;
                "COMMIT".to_owned()
            }
        };
        script.push_str(&line);
        script.push('\n');
    }
    script.push_str("END\n");
    script
}
