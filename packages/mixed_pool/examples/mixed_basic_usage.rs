//! Example demonstrating basic usage of `MixedPool`.
//!
//! Stores a few unrelated types in one pool, reads them back with checked downcasts and shows
//! what happens to indexes when an entry is removed.

use std::thread;

use mixed_pool::{Error, MixedPool};

struct Plugin {
    name: &'static str,
    priority: u8,
}

fn main() -> Result<(), Error> {
    println!("=== MixedPool: heterogeneous, index-addressed, thread-safe ===");

    let pool = MixedPool::new();

    pool.add(Plugin {
        name: "compressor",
        priority: 3,
    });
    pool.add("Now is the time.".to_string());
    pool.add(2.5_f64);

    {
        let plugin = pool.get::<Plugin>(0)?;
        println!("Plugin: {} (priority {})", plugin.name, plugin.priority);
    }
    println!("Text: {}", *pool.get::<String>(1)?);
    println!("Number: {}", *pool.get::<f64>(2)?);

    // Asking for the wrong type is reported, not reinterpreted.
    match pool.get::<u32>(1) {
        Ok(_) => unreachable!("entry 1 holds a String"),
        Err(error) => println!("Expected failure: {error}"),
    }

    println!("Stored types: {:?}", pool.type_names());

    // Removing an entry shifts every later entry down by one.
    pool.remove(0)?;
    println!("After removing entry 0: {:?}", pool.type_names());

    // Many readers may look at the pool at the same time.
    thread::scope(|s| {
        for reader in 0..3 {
            let pool = &pool;
            s.spawn(move || {
                if let Ok(text) = pool.get::<String>(0) {
                    println!("Reader {reader} sees: {}", *text);
                }
            });
        }
    });

    println!("Pool length: {}", pool.len());

    pool.clear();
    println!("Pool length after clear: {}", pool.len());

    Ok(())
}
