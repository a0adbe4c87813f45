//! Disc Hero headless entry point
//!
//! Runs the simulation with a simple autopilot, then saves progress.
//! Usage: `disc-hero [seed] [seconds]`. Data lives in `$DISC_HERO_DATA`
//! (default `./disc-hero-data`).

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use disc_hero::Settings;
    use disc_hero::consts::*;
    use disc_hero::persistence::{FileStore, load_or_new, save_game};
    use disc_hero::sim::{GameKey, GameState, InputSnapshot, SoundKey, tick};
    use glam::Vec2;

    /// Display refresh the driver pretends to run at
    const DISPLAY_DT: f32 = 1000.0 / 60.0;

    /// Keeps a safe distance from the closest enemy and shoots at it
    #[derive(Default)]
    struct Autopilot {
        previous: InputSnapshot,
    }

    impl Autopilot {
        fn input(&mut self, state: &GameState) -> InputSnapshot {
            let hero = &state.hero;
            let target = state
                .active_enemies()
                .map(|e| e.pos)
                .min_by(|a, b| a.distance_squared(hero.pos).total_cmp(&b.distance_squared(hero.pos)));

            let mut input = InputSnapshot::default();
            let heading = match target {
                Some(pos) => {
                    input.aim = Some(pos);
                    let distance = pos.distance(hero.pos);
                    if distance > 300.0 {
                        pos - hero.pos
                    } else if distance < 150.0 {
                        hero.pos - pos
                    } else {
                        Vec2::ZERO
                    }
                }
                // Explore outward
                None => Vec2::new(1.0, 0.3),
            };
            if heading.x > 1.0 {
                input.down.insert(GameKey::Right);
            } else if heading.x < -1.0 {
                input.down.insert(GameKey::Left);
            }
            if heading.y > 1.0 {
                input.down.insert(GameKey::Down);
            } else if heading.y < -1.0 {
                input.down.insert(GameKey::Up);
            }
            if hero.charge >= MAX_CHARGE {
                input.down.insert(GameKey::Charge);
            }
            if state.active_loot.is_some() && state.time_ticks % 25 == 0 {
                input.down.insert(GameKey::Interact);
            }

            input.pressed = input.down.difference(&self.previous.down).copied().collect();
            input.released = self.previous.down.difference(&input.down).copied().collect();
            self.previous = input.clone();
            input
        }
    }

    #[derive(Default)]
    struct RunStats {
        ticks: u64,
        shots: u64,
        kills: u64,
        deaths: u64,
        level_ups: u64,
    }

    impl RunStats {
        fn record(&mut self, sounds: &[SoundKey]) {
            for sound in sounds {
                match sound {
                    SoundKey::Shoot => self.shots += 1,
                    SoundKey::EnemyDeath => self.kills += 1,
                    SoundKey::HeroDeath => self.deaths += 1,
                    SoundKey::LevelUp => self.level_ups += 1,
                    _ => {}
                }
            }
        }
    }

    pub fn run() {
        env_logger::init();
        log::info!("Disc Hero (headless) starting...");

        let mut args = std::env::args().skip(1);
        let seed = args.next().and_then(|s| s.parse::<u32>().ok()).unwrap_or(1);
        let seconds = args.next().and_then(|s| s.parse::<f32>().ok()).unwrap_or(60.0);
        let data_dir = std::env::var("DISC_HERO_DATA").unwrap_or_else(|_| "disc-hero-data".to_string());

        let mut store = FileStore::new(data_dir);
        let settings = Settings::load(&store);
        let mut state = load_or_new(&store, seed, settings);
        log::info!(
            "World {} ready: hero level {} at ({:.0}, {:.0})",
            state.world_seed,
            state.hero.level,
            state.hero.pos.x,
            state.hero.pos.y
        );

        let mut autopilot = Autopilot::default();
        let mut stats = RunStats::default();
        let mut accumulator = 0.0;
        let mut elapsed = 0.0;
        while elapsed < seconds * 1000.0 {
            elapsed += DISPLAY_DT;
            accumulator += DISPLAY_DT;

            let mut substeps = 0;
            while accumulator >= FRAME_LENGTH && substeps < MAX_SUBSTEPS {
                let input = autopilot.input(&state);
                tick(&mut state, &input);
                accumulator -= FRAME_LENGTH;
                substeps += 1;
                stats.ticks += 1;
            }

            let sounds = std::mem::take(&mut state.sounds);
            stats.record(&sounds);
        }

        log::info!(
            "Ran {} ticks: {} shots, {} kills, {} deaths, {} level-ups",
            stats.ticks,
            stats.shots,
            stats.kills,
            stats.deaths,
            stats.level_ups
        );
        match &state.dungeon {
            Some(dungeon) => log::info!("Hero ended inside {}", dungeon.name),
            None => log::info!("Hero ended in the overworld"),
        }
        log::info!(
            "Hero level {} with {} coins, {} items carried",
            state.hero.level,
            state.hero.coins,
            state.hero.inventory.len()
        );

        if let Err(e) = save_game(&mut store, &state) {
            log::warn!("Failed to save game: {e}");
        }
        state.settings.save(&mut store);
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    native::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The browser host drives `disc_hero::sim::tick` directly
}
