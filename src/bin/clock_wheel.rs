//! Reference scenario: a seconds/minutes/hours wheel driven for 1000 ticks.

use tickwheel::{TimerWheel, WheelBuilder};

fn schedule(wheel: &mut TimerWheel, delay: u64) {
    println!("scheduling task with delay {}", delay);
    if let Err(err) = wheel.submit(delay, move || println!("task {} fired", delay)) {
        println!("failed to schedule task {}: {}", delay, err);
    }
}

fn main() {
    let mut wheel = match WheelBuilder::new()
        .level(60, 1)
        .level(60, 60)
        .level(24, 3600)
        .build()
    {
        Ok(wheel) => wheel,
        Err(err) => {
            eprintln!("failed to build wheel: {}", err);
            return;
        }
    };

    for delay in [0, 1, 2, 350, 600, 650, 864, 957] {
        schedule(&mut wheel, delay);
    }

    // a day plus one second is past the top level's span
    schedule(&mut wheel, 24 * 60 * 60 + 1);

    for _ in 0..1000 {
        wheel.advance();
    }

    println!("{} tasks still pending", wheel.pending());
}
