//! Wave table and expansion of a wave into timed spawn events.

use log::info;
use shared::{hp_scale, EnemyTag, EnemyType, Element, WaveConfig};
use std::collections::BTreeMap;

/// One enemy to spawn, `spawn_at_sec` after the wave started.
#[derive(Debug, Clone, PartialEq)]
pub struct SpawnEvent {
    pub spawn_at_sec: f64,
    pub enemy_type: EnemyType,
    pub hp: f64,
    pub speed: f64,
    pub armor: f64,
    pub tags: Vec<EnemyTag>,
    pub resistances: BTreeMap<Element, f64>,
}

pub struct WaveScheduler {
    waves: Vec<WaveConfig>,
    /// 1-based; 0 until the first wave starts.
    current_wave: u32,
}

impl WaveScheduler {
    pub fn new(waves: Vec<WaveConfig>) -> Self {
        Self {
            waves,
            current_wave: 0,
        }
    }

    /// Moves the cursor to the next wave and returns it, or `None` when the
    /// table is exhausted.
    pub fn advance(&mut self) -> Option<&WaveConfig> {
        if !self.has_more_waves() {
            return None;
        }
        self.current_wave += 1;
        let config = self.current_config()?;
        info!("Wave {}: {}", config.wave, config.telegraph);
        Some(config)
    }

    pub fn current_wave(&self) -> u32 {
        self.current_wave
    }

    pub fn current_config(&self) -> Option<&WaveConfig> {
        let index = self.current_wave.checked_sub(1)?;
        self.waves.get(index as usize)
    }

    pub fn has_more_waves(&self) -> bool {
        (self.current_wave as usize) < self.waves.len()
    }

    pub fn total_waves(&self) -> u32 {
        self.waves.len() as u32
    }

    /// Spawn events of the current wave, with health scaled for the party
    /// and sorted by time. Within a group, enemy `i` spawns at
    /// `i x spawn_interval_sec`; groups run side by side.
    pub fn get_spawn_events(&self, player_count: usize) -> Vec<SpawnEvent> {
        let Some(config) = self.current_config() else {
            return Vec::new();
        };
        let scale = hp_scale(player_count);

        let mut events: Vec<SpawnEvent> = config
            .groups
            .iter()
            .flat_map(|group| {
                (0..group.count).map(move |i| SpawnEvent {
                    spawn_at_sec: i as f64 * group.spawn_interval_sec,
                    enemy_type: group.enemy_type,
                    hp: (group.hp * scale).round(),
                    speed: group.speed,
                    armor: group.armor,
                    tags: group.tags.clone(),
                    resistances: group.resistances.clone(),
                })
            })
            .collect();
        events.sort_by(|a, b| a.spawn_at_sec.total_cmp(&b.spawn_at_sec));
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;
    use shared::data::standard_waves;

    #[test]
    fn test_cursor_starts_before_first_wave() {
        let scheduler = WaveScheduler::new(standard_waves());
        assert_eq!(scheduler.current_wave(), 0);
        assert!(scheduler.current_config().is_none());
        assert!(scheduler.get_spawn_events(1).is_empty());
        assert!(scheduler.has_more_waves());
        assert_eq!(scheduler.total_waves(), 8);
    }

    #[test]
    fn test_advance_until_exhausted() {
        let mut scheduler = WaveScheduler::new(standard_waves());
        for wave in 1..=8 {
            assert_eq!(scheduler.advance().unwrap().wave, wave);
        }
        assert!(!scheduler.has_more_waves());
        assert!(scheduler.advance().is_none());
        assert_eq!(scheduler.current_wave(), 8);
    }

    #[test]
    fn test_first_wave_spawn_times() {
        let mut scheduler = WaveScheduler::new(standard_waves());
        scheduler.advance();

        let events = scheduler.get_spawn_events(1);
        assert_eq!(events.len(), 5);
        for (i, event) in events.iter().enumerate() {
            assert_eq!(event.enemy_type, EnemyType::Grunt);
            assert_approx_eq!(event.spawn_at_sec, i as f64);
            assert_approx_eq!(event.hp, 30.0);
        }
    }

    #[test]
    fn test_hp_scales_with_party_size() {
        let mut scheduler = WaveScheduler::new(standard_waves());
        scheduler.advance();

        // 30 x 1.3 = 39, 30 x 1.9 = 57
        assert_approx_eq!(scheduler.get_spawn_events(2)[0].hp, 39.0);
        assert_approx_eq!(scheduler.get_spawn_events(4)[0].hp, 57.0);
    }

    #[test]
    fn test_groups_interleave_by_time() {
        let mut scheduler = WaveScheduler::new(standard_waves());
        scheduler.advance();
        scheduler.advance();

        let events = scheduler.get_spawn_events(1);
        assert_eq!(events.len(), 11);
        assert!(events
            .windows(2)
            .all(|pair| pair[0].spawn_at_sec <= pair[1].spawn_at_sec));
        assert_eq!(events[0].enemy_type, EnemyType::Grunt);
        assert_eq!(events[1].enemy_type, EnemyType::Runner);
        assert_approx_eq!(events[1].spawn_at_sec, 0.0);
    }
}
