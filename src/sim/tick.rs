//! Fixed timestep simulation tick
//!
//! Core game loop that advances simulation deterministically, one
//! `FRAME_LENGTH` step per call.

use glam::Vec2;

use super::bullet::{Bullet, BulletBehavior, BulletSource, OrbitCenter, SeekTarget, advance_bullet};
use super::collision::circles_intersect;
use super::combat::{burn_enemy, hit_enemy};
use super::disc::{DiscId, find_closest_disc};
use super::enemy::{Enemy, EnemyId};
use super::hero::{burn_hero, damage_hero};
use super::items::{EquipmentSlot, Item, ORB_ORBIT_RADIUS, SEEK_TURN_RATE, ShotKind, WeaponShot};
use super::state::{BossFight, GameKey, GameState, InputSnapshot, LootRef, SoundKey, play_sound};
use crate::consts::*;
use crate::{heading, polar_to_cartesian};

/// Advance the game state by one fixed timestep
pub fn tick(state: &mut GameState, input: &InputSnapshot) {
    state.refresh_active_area();
    move_hero(state, input);
    update_attack(state, input);
    update_enemies(state);
    reassign_discs(state);
    update_hero_bullets(state);
    update_enemy_bullets(state);
    if state.hero.life <= 0.0 {
        play_sound(state, SoundKey::HeroDeath);
        state.respawn_hero();
    }
    sweep(state);
    update_loot(state, input);
    state.time_ticks += 1;
}

/// Enemies outside the boss arena sit still during a fight; the arena
/// itself waits for the intro to finish
fn is_frozen(state: &GameState, enemy: &Enemy) -> bool {
    match state.boss_fight {
        None => false,
        Some(fight) => enemy.disc != Some(fight.disc) || !fight.is_active(),
    }
}

/// Hero bullets only connect with enemies the hero can currently see
fn is_targetable(state: &GameState, enemy: &Enemy) -> bool {
    match state.boss_fight {
        None => true,
        Some(fight) => enemy.disc == Some(fight.disc),
    }
}

fn move_hero(state: &mut GameState, input: &InputSnapshot) {
    if state.hero.life <= 0.0 {
        return;
    }
    let direction = input.move_direction();
    if direction != Vec2::ZERO {
        let step = direction * state.hero.speed() * FRAME_SECONDS;
        let target = state.hero.pos + step;
        state.hero.pos = match state.hero.disc.and_then(|id| state.disc(id)) {
            Some(disc) => disc.clamp_point(target),
            None => target,
        };
    }
}

fn update_attack(state: &mut GameState, input: &InputSnapshot) {
    if input.was_pressed(GameKey::Charge) && state.hero.activate_charge() {
        log::debug!("Charged attack armed");
        play_sound(state, SoundKey::Charge);
    }
    let Some(aim) = input.aim else {
        state.hero.attack_time = 0.0;
        return;
    };
    if state.hero.life <= 0.0 {
        return;
    }

    let theta = heading(aim - state.hero.pos);
    state.hero.theta = theta;
    let cooldown = state.hero.attack_cooldown();
    let shots = state.hero.weapon.kind.shots();
    let start = state.hero.attack_time;
    let end = start + FRAME_LENGTH;
    fire_window(state, shots, start, end.min(cooldown), cooldown, theta);
    if end >= cooldown {
        // Cycle complete; a charged attack lasts exactly one cycle
        state.hero.charged_attack = false;
        let wrapped = end - cooldown;
        fire_window(state, shots, 0.0, wrapped, cooldown, theta);
        state.hero.attack_time = wrapped;
    } else {
        state.hero.attack_time = end;
    }
}

/// Fire every shot whose beat falls in `[from, to)` of the attack cycle
fn fire_window(state: &mut GameState, shots: &[WeaponShot], from: f32, to: f32, cooldown: f32, theta: f32) {
    for shot in shots {
        let beat = shot.timing_offset * cooldown;
        if beat >= from && beat < to {
            fire_hero_shot(state, shot, theta);
        }
    }
}

fn fire_hero_shot(state: &mut GameState, shot: &WeaponShot, aim: f32) {
    let hero = &state.hero;
    let theta = aim + shot.angle_offset;
    let size = if hero.charged_attack {
        CHARGED_SIZE_MULTIPLIER
    } else {
        1.0
    };
    let damage = hero.shot_damage() * shot.damage_factor;
    let radius = shot.radius * size;
    let muzzle = hero.pos + polar_to_cartesian(hero.radius, theta);
    let velocity = polar_to_cartesian(shot.speed, theta);

    let mut bullet = match shot.kind {
        ShotKind::Straight => Bullet::new(BulletSource::Hero, muzzle, velocity, radius, shot.duration, damage),
        ShotKind::Seek => Bullet::new(BulletSource::Hero, muzzle, velocity, radius, shot.duration, damage)
            .with_behavior(BulletBehavior::Seeking {
                target: SeekTarget::Enemies,
                turn_rate: SEEK_TURN_RATE,
            }),
        ShotKind::Orbit => Bullet::orbiting(
            BulletSource::Hero,
            OrbitCenter::Hero,
            hero.pos,
            theta,
            shot.speed,
            ORB_ORBIT_RADIUS,
            radius,
            shot.duration,
            damage,
        )
        .piercing(),
    }
    .with_charge_gain(CHARGE_PER_HIT * shot.damage_factor);
    for enchantment in &hero.weapon.enchantments {
        enchantment.apply_to_bullet(&mut bullet);
    }
    state.hero_bullets.push(bullet);
    play_sound(state, SoundKey::Shoot);
}

fn update_enemies(state: &mut GameState) {
    let ids: Vec<EnemyId> = state
        .active_enemies()
        .filter(|e| e.is_alive() && !is_frozen(state, e))
        .map(|e| e.id)
        .collect();
    for id in ids {
        let Some(mut enemy) = state.enemies.remove(&id) else {
            continue;
        };
        // A master may have taken this one down earlier in the frame
        if enemy.is_alive() {
            enemy.mode_time += FRAME_LENGTH;
            enemy.definition.behavior.update(state, &mut enemy);
        }
        state.enemies.insert(id, enemy);
    }
}

/// Put everyone back on a disc, and start or run the boss fight
fn reassign_discs(state: &mut GameState) {
    if let Some(fight) = state.boss_fight.as_mut() {
        fight.time += FRAME_LENGTH;
    }

    if let Some(fight) = state.boss_fight {
        if !state.enemies.get(&fight.boss).is_some_and(|b| b.is_alive()) {
            state.boss_fight = None;
        } else {
            clamp_to_arena(state, fight.disc);
            return;
        }
    }

    let discs = state.active_disc_list();
    let hero_disc = find_closest_disc(state.hero.pos, discs.iter().copied()).map(|d| (d.id, d.clamp_point(state.hero.pos)));
    let moves: Vec<(EnemyId, DiscId, Vec2)> = state
        .active_enemies()
        .filter_map(|e| {
            let disc = find_closest_disc(e.pos, discs.iter().copied())?;
            Some((e.id, disc.id, disc.clamp_point(e.pos)))
        })
        .collect();

    if let Some((disc, pos)) = hero_disc {
        state.hero.disc = Some(disc);
        state.hero.pos = pos;
    }
    for (id, disc, pos) in moves {
        if let Some(enemy) = state.enemies.get_mut(&id) {
            enemy.disc = Some(disc);
            enemy.pos = pos;
        }
    }

    let boss = state
        .hero
        .disc
        .and_then(|id| state.disc(id))
        .and_then(|disc| disc.boss.map(|boss| (disc.id, boss)));
    if let Some((disc, boss)) = boss {
        if state.enemies.get(&boss).is_some_and(|b| b.is_alive()) {
            let name = state.enemies[&boss].definition.name;
            log::info!("Boss fight: {name}");
            state.boss_fight = Some(BossFight { disc, boss, time: 0.0 });
            play_sound(state, SoundKey::BossIntro);
        }
    }
}

fn clamp_to_arena(state: &mut GameState, arena: DiscId) {
    let Some(disc) = state.disc(arena) else {
        return;
    };
    let hero_pos = disc.clamp_point(state.hero.pos);
    let moves: Vec<(EnemyId, Vec2)> = state
        .enemies
        .values()
        .filter(|e| e.disc == Some(arena))
        .map(|e| (e.id, disc.clamp_point(e.pos)))
        .collect();
    state.hero.pos = hero_pos;
    state.hero.disc = Some(arena);
    for (id, pos) in moves {
        if let Some(enemy) = state.enemies.get_mut(&id) {
            enemy.pos = pos;
        }
    }
}

fn update_hero_bullets(state: &mut GameState) {
    let mut bullets = std::mem::take(&mut state.hero_bullets);
    let targets: Vec<EnemyId> = state
        .active_enemies()
        .filter(|e| is_targetable(state, e))
        .map(|e| e.id)
        .collect();

    for bullet in bullets.iter_mut() {
        advance_bullet(state, bullet);
        if bullet.is_expired() || !bullet.is_armed() {
            continue;
        }
        for id in &targets {
            if bullet.consumed {
                break;
            }
            let lingering = bullet.damage_over_time > 0.0;
            let touching = state.enemies.get(id).is_some_and(|e| {
                e.is_alive()
                    && !e.invulnerable
                    && (lingering || !bullet.hit_targets.contains(id))
                    && circles_intersect(&*bullet, e)
            });
            if !touching {
                continue;
            }
            let Some(mut enemy) = state.enemies.remove(id) else {
                continue;
            };
            if lingering {
                burn_enemy(state, &mut enemy, bullet.damage_over_time);
            } else {
                hit_enemy(state, &mut enemy, bullet);
            }
            state.enemies.insert(*id, enemy);
        }
    }

    bullets.append(&mut state.hero_bullets);
    state.hero_bullets = bullets;
}

fn update_enemy_bullets(state: &mut GameState) {
    let mut bullets = std::mem::take(&mut state.enemy_bullets);
    for bullet in bullets.iter_mut() {
        advance_bullet(state, bullet);
        if bullet.is_expired() || !bullet.is_armed() || state.hero.life <= 0.0 {
            continue;
        }
        if !circles_intersect(&*bullet, &state.hero) {
            continue;
        }
        if bullet.damage_over_time > 0.0 {
            burn_hero(state, bullet.damage_over_time);
        } else {
            damage_hero(state, bullet.damage);
            bullet.consumed = true;
        }
    }
    bullets.append(&mut state.enemy_bullets);
    state.enemy_bullets = bullets;
}

/// End-of-frame cleanup: spent bullets and dead enemies, plus every key
/// that still points at them
fn sweep(state: &mut GameState) {
    state.hero_bullets.retain(|b| !b.is_done());
    state.enemy_bullets.retain(|b| !b.is_done());

    let dead: Vec<EnemyId> = state.enemies.values().filter(|e| !e.is_alive()).map(|e| e.id).collect();
    for id in &dead {
        let Some(enemy) = state.enemies.remove(id) else {
            continue;
        };
        if let Some(disc) = state.disc_mut(enemy.home) {
            disc.enemies.retain(|e| e != id);
        }
        if let Some(master) = enemy.master.and_then(|m| state.enemies.get_mut(&m)) {
            master.minions.retain(|m| m != id);
        }
    }
    if state.boss_fight.is_some_and(|f| !state.enemies.contains_key(&f.boss)) {
        state.boss_fight = None;
    }
}

fn update_loot(state: &mut GameState, input: &InputSnapshot) {
    let hero_pos = state.hero.pos;
    if let Some(selected) = state.active_loot {
        let in_range = state
            .disc(selected.disc)
            .and_then(|d| d.loot.get(selected.index))
            .is_some_and(|l| l.pos.distance(hero_pos) <= ACTIVE_LOOT_RANGE);
        if !in_range {
            state.active_loot = None;
        }
    }
    if state.active_loot.is_none() {
        state.active_loot = nearest_loot(state);
    }

    if let Some(selected) = state.active_loot {
        if input.was_pressed(GameKey::Interact) {
            activate_loot(state, selected);
            return;
        }
        if input.was_pressed(GameKey::Sell) {
            sell_loot(state, selected);
            return;
        }
    }

    if input.was_pressed(GameKey::Interact) {
        let destination = state
            .hero
            .disc
            .and_then(|id| state.disc(id))
            .and_then(|disc| disc.portals.iter().find(|p| circles_intersect(*p, &state.hero)))
            .map(|p| p.destination);
        if let Some(destination) = destination {
            play_sound(state, SoundKey::Portal);
            state.travel(destination);
        }
    }
}

fn nearest_loot(state: &GameState) -> Option<LootRef> {
    let hero_pos = state.hero.pos;
    state
        .active_disc_list()
        .into_iter()
        .flat_map(|disc| {
            disc.loot
                .iter()
                .enumerate()
                .map(move |(index, loot)| (LootRef { disc: disc.id, index }, loot.pos.distance(hero_pos)))
        })
        .filter(|(_, distance)| *distance <= ACTIVE_LOOT_RANGE)
        .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(loot, _)| loot)
}

fn take_loot(state: &mut GameState, selected: LootRef) -> Option<Item> {
    state.active_loot = None;
    let disc = state.disc_mut(selected.disc)?;
    if selected.index >= disc.loot.len() {
        return None;
    }
    Some(disc.loot.remove(selected.index).item)
}

/// Equip, socket or drink the selected loot
fn activate_loot(state: &mut GameState, selected: LootRef) {
    let Some(item) = take_loot(state, selected) else {
        return;
    };
    log::debug!("Picked up {}", item.name());
    let hero = &mut state.hero;
    match item {
        Item::Weapon(weapon) => {
            let old = hero.equip_weapon(weapon);
            hero.inventory.push(Item::Weapon(old));
        }
        Item::Armor(armor) => {
            let old = hero.equip_armor(armor);
            hero.inventory.push(Item::Armor(old));
        }
        Item::Enchantment(enchantment) => {
            let socketed = match enchantment.slot() {
                EquipmentSlot::Weapon => hero.weapon.add_enchantment(enchantment),
                EquipmentSlot::Armor => hero.armor.add_enchantment(enchantment),
            };
            if !socketed {
                hero.inventory.push(Item::Enchantment(enchantment));
            }
        }
        Item::Potion { heal } => {
            let amount = hero.max_life() * heal;
            hero.heal(amount);
        }
    }
    play_sound(state, SoundKey::Pickup);
}

fn sell_loot(state: &mut GameState, selected: LootRef) {
    if let Some(item) = take_loot(state, selected) {
        state.hero.coins += item.value();
        log::debug!("Sold {} for {}", item.name(), item.value());
        play_sound(state, SoundKey::Sell);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::disc::AreaId;
    use crate::sim::enemy::{EnemyBehavior, EnemyDefinition};
    use crate::sim::hero::Hero;
    use crate::sim::items::{Loot, WeaponType, generate_weapon};
    use crate::world::{DungeonKind, DungeonRecipe};
    use std::collections::BTreeSet;

    struct Idle;

    impl EnemyBehavior for Idle {
        fn update(&self, _state: &mut GameState, _enemy: &mut Enemy) {}
    }

    static STATUE: EnemyDefinition = EnemyDefinition::new("Statue", &Idle);

    /// Fresh game with every generated enemy removed
    fn quiet_state(seed: u32) -> GameState {
        let mut state = GameState::new(seed);
        state.enemies.clear();
        state
    }

    fn enemy_shot(pos: Vec2, damage: f32, duration: f32) -> Bullet {
        let source = BulletSource::Enemy(EnemyId::new(AreaId::Dungeon(999), 0));
        Bullet::new(source, pos, Vec2::ZERO, 6.0, duration, damage)
    }

    fn press(key: GameKey) -> InputSnapshot {
        InputSnapshot::default().advance(BTreeSet::from([key]), None)
    }

    #[test]
    fn test_bullet_expires_on_exact_tick() {
        let mut state = quiet_state(100);
        let pos = state.hero.pos + Vec2::new(400.0, 0.0);
        state.enemy_bullets.push(enemy_shot(pos, 1.0, 1000.0));
        let input = InputSnapshot::default();
        for _ in 0..49 {
            tick(&mut state, &input);
        }
        assert_eq!(state.enemy_bullets.len(), 1);
        tick(&mut state, &input);
        assert!(state.enemy_bullets.is_empty());
    }

    #[test]
    fn test_warning_blocks_damage() {
        let mut state = quiet_state(100);
        let life = state.hero.life;
        let shot = enemy_shot(state.hero.pos, 10.0, 1000.0).with_warning(100.0);
        state.enemy_bullets.push(shot);
        let input = InputSnapshot::default();
        for _ in 0..4 {
            tick(&mut state, &input);
        }
        assert_eq!(state.hero.life, life);
        tick(&mut state, &input);
        assert!(state.hero.life < life);
        assert!(state.enemy_bullets.is_empty(), "hit consumes the bullet");
    }

    #[test]
    fn test_multi_shot_sub_beats() {
        let mut state = quiet_state(100);
        state.hero.weapon = generate_weapon(WeaponType::Dagger, 1, &[]);
        let aim = Some(state.hero.pos + Vec2::new(300.0, 0.0));
        let input = InputSnapshot::default().advance(BTreeSet::new(), aim);
        let mut counts = Vec::new();
        for _ in 0..13 {
            tick(&mut state, &input);
            counts.push(state.hero_bullets.len());
        }
        // Cooldown ≈ 822 ms: beats at 0, ~123 and ~247 ms
        assert_eq!(counts[0], 1);
        assert_eq!(counts[5], 1);
        assert_eq!(counts[6], 2);
        assert_eq!(counts[11], 2);
        assert_eq!(counts[12], 3);
    }

    #[test]
    fn test_charged_attack_lasts_one_cycle() {
        let mut state = quiet_state(100);
        state.hero.charge = MAX_CHARGE;
        let aim = Some(state.hero.pos + Vec2::new(300.0, 0.0));
        let input = InputSnapshot::default().advance(BTreeSet::from([GameKey::Charge]), aim);
        tick(&mut state, &input);
        assert!(state.hero.charged_attack);
        assert_eq!(state.hero.charge, 0.0);
        let charged = state.hero_bullets[0].radius;

        let hold = input.advance(BTreeSet::new(), aim);
        let cycle_ticks = (state.hero.attack_cooldown() / FRAME_LENGTH).ceil() as usize;
        for _ in 0..cycle_ticks {
            tick(&mut state, &hold);
        }
        assert!(!state.hero.charged_attack);
        let latest = state.hero_bullets.last().map(|b| b.radius).unwrap_or_default();
        assert!(charged > latest);
    }

    #[test]
    fn test_lingering_pool_burns_hero_at_its_rate() {
        let mut state = quiet_state(100);
        let life = state.hero.max_life();
        state.hero.life = life;
        let pool = enemy_shot(state.hero.pos, 0.0, 2000.0).with_damage_over_time(10.0);
        state.enemy_bullets.push(pool);
        let input = InputSnapshot::default();
        for _ in 0..50 {
            tick(&mut state, &input);
        }
        // One second at 10 dps, no armor rounding per frame
        assert!((life - state.hero.life - 10.0).abs() < 1e-3);
        assert_eq!(state.enemy_bullets.len(), 1, "pools are never consumed");
    }

    #[test]
    fn test_lingering_shot_burns_enemy() {
        let mut state = quiet_state(100);
        let home = state.hero.disc.unwrap_or_else(|| panic!("hero is not on a disc"));
        let id = state.spawn_enemy(&STATUE, state.hero.pos + Vec2::new(60.0, 0.0), home, 5);
        let (pos, life) = (state.enemies[&id].pos, state.enemies[&id].life);
        let pool = Bullet::new(BulletSource::Hero, pos, Vec2::ZERO, 20.0, 2000.0, 0.0).with_damage_over_time(10.0);
        state.hero_bullets.push(pool);
        let input = InputSnapshot::default();
        for _ in 0..50 {
            tick(&mut state, &input);
        }
        assert!((life - state.enemies[&id].life - 10.0).abs() < 1e-3);
        assert_eq!(state.hero_bullets.len(), 1);
    }

    #[test]
    fn test_mode_timer_advances_before_update() {
        let mut state = quiet_state(100);
        let home = state.hero.disc.unwrap_or_else(|| panic!("hero is not on a disc"));
        let id = state.spawn_enemy(&STATUE, state.hero.pos + Vec2::new(60.0, 0.0), home, 1);
        let input = InputSnapshot::default();
        for _ in 0..3 {
            tick(&mut state, &input);
        }
        assert_eq!(state.enemies[&id].mode_time, 3.0 * FRAME_LENGTH);
    }

    #[test]
    fn test_hero_death_respawns_at_origin() {
        let mut state = quiet_state(100);
        state.enter_dungeon(DungeonRecipe {
            seed: 5,
            level: 3,
            kind: DungeonKind::Cavern,
        });
        state.enemies.clear();
        state.hero.life = 1.0;
        state.enemy_bullets.push(enemy_shot(state.hero.pos, 1000.0, 1000.0));
        tick(&mut state, &InputSnapshot::default());
        assert!(!state.in_dungeon());
        assert_eq!(state.hero.pos, Vec2::ZERO);
        assert_eq!(state.hero.life, state.hero.max_life());
        assert!(state.sounds.contains(&SoundKey::HeroDeath));
    }

    #[test]
    fn test_boss_fight_isolates_and_resolves() {
        let mut state = quiet_state(100);
        state.enter_dungeon(DungeonRecipe {
            seed: 8,
            level: 4,
            kind: DungeonKind::Cavern,
        });
        let arena = state.dungeon.as_ref().map(|d| d.boss_disc).unwrap_or_else(|| panic!("no dungeon"));
        let arena_pos = state.disc(arena).map(|d| d.pos).unwrap_or_default();
        let boss = state.disc(arena).and_then(|d| d.boss).unwrap_or_else(|| panic!("no boss"));
        // Sturdy enough to shrug off the boss while the test walks around
        state.hero = Hero::new(30);
        state.hero.pos = arena_pos + Vec2::new(30.0, 0.0);

        let input = InputSnapshot::default();
        tick(&mut state, &input);
        assert!(state.boss_fight.is_some_and(|f| f.boss == boss && !f.is_active()));
        let bystander = state
            .enemies
            .values()
            .find(|e| e.disc != Some(arena))
            .map(|e| e.id);
        let frozen_time = bystander.map(|id| state.enemies[&id].mode_time);
        for _ in 0..55 {
            tick(&mut state, &input);
        }
        assert!(state.boss_fight.is_some_and(|f| f.is_active()));
        assert_eq!(bystander.map(|id| state.enemies[&id].mode_time), frozen_time);

        // Walking away doesn't leave the arena
        let right = InputSnapshot::default().advance(BTreeSet::from([GameKey::Right]), None);
        for _ in 0..100 {
            tick(&mut state, &right);
        }
        assert_eq!(state.hero.disc, Some(arena));

        let boss_pos = state.enemies[&boss].pos;
        let finisher = Bullet::new(BulletSource::Hero, boss_pos, Vec2::ZERO, 10.0, 1000.0, 1e9);
        state.hero_bullets.push(finisher);
        tick(&mut state, &input);
        assert!(!state.enemies.contains_key(&boss));
        assert!(state.boss_fight.is_none());
        let disc = state.disc(arena).unwrap_or_else(|| panic!("arena gone"));
        assert!(disc.boss.is_none());
        assert_eq!(
            disc.portals
                .iter()
                .filter(|p| p.destination == crate::sim::disc::PortalDestination::Overworld)
                .count(),
            1
        );
    }

    #[test]
    fn test_loot_pickup_and_sale() {
        let mut state = quiet_state(100);
        let home = state.hero.disc.unwrap_or_else(|| panic!("hero is not on a disc"));
        let spot = state.hero.pos + Vec2::new(20.0, 0.0);
        if let Some(disc) = state.disc_mut(home) {
            disc.loot.clear();
            disc.loot.push(Loot::new(spot, Item::Potion { heal: 0.5 }));
        }
        state.hero.life = 10.0;
        tick(&mut state, &press(GameKey::Interact));
        assert!(state.hero.life > 10.0);
        assert!(state.disc(home).is_some_and(|d| d.loot.is_empty()));

        let weapon = Item::Weapon(generate_weapon(WeaponType::Staff, 3, &[]));
        let value = weapon.value();
        let hero_pos = state.hero.pos;
        if let Some(disc) = state.disc_mut(home) {
            disc.loot.push(Loot::new(hero_pos, weapon));
        }
        tick(&mut state, &press(GameKey::Sell));
        assert_eq!(state.hero.coins, value);
        assert_eq!(state.hero.weapon.kind, WeaponType::Bow);
    }

    #[test]
    fn test_determinism() {
        let run = || {
            let mut state = GameState::new(2024);
            let keys = BTreeSet::from([GameKey::Right, GameKey::Down]);
            let mut input = InputSnapshot::default();
            for frame in 0..300u32 {
                let aim = state.hero.pos + Vec2::new(100.0, 50.0);
                input = input.advance(if frame % 60 < 30 { keys.clone() } else { BTreeSet::new() }, Some(aim));
                tick(&mut state, &input);
            }
            let enemies: Vec<(EnemyId, Vec2)> = state.enemies.values().map(|e| (e.id, e.pos)).collect();
            (state.hero.pos, state.hero.life, state.hero.experience, enemies)
        };
        assert_eq!(run(), run());
    }
}
