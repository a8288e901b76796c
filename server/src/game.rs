use crate::combat::{AttackResult, CombatSystem};
use crate::economy::EconomySystem;
use crate::enemy::{DamageDealt, EnemySystem};
use crate::error::CommandError;
use crate::reaction::{ReactionResult, ReactionSystem};
use crate::room::GameRoom;
use crate::tower::{TowerSystem, UpgradeQuote};
use crate::utils::validate_message;
use crate::wave::{SpawnEvent, WaveScheduler};
use log::{debug, info};
use shared::{
    leak_damage, Catalog, ClientCommand, CommandResult, Element, EnemyId, GameState, Phase,
    PlayerId, ServerEvent, TargetingMode, TowerId, BASE_MAX_HP, PREP_PHASE_DURATION_SEC,
    SPLASH_DAMAGE_FACTOR,
};
use std::collections::VecDeque;
use std::sync::Arc;

/// Authoritative state of one match.
///
/// Every subsystem owns its own collection; this type sequences them, runs
/// the phase machine and records what happened as [`ServerEvent`]s.
pub struct GameSimulation {
    catalog: Arc<Catalog>,
    phase: Phase,
    tick: u64,
    base_hp: i32,
    max_waves: u32,
    prep_time_remaining: f64,
    wave_clock: f64,
    spawn_queue: VecDeque<SpawnEvent>,
    room: GameRoom,
    economy: EconomySystem,
    enemies: EnemySystem,
    towers: TowerSystem,
    combat: CombatSystem,
    reactions: ReactionSystem,
    waves: WaveScheduler,
    events: Vec<ServerEvent>,
}

impl Default for GameSimulation {
    fn default() -> Self {
        Self::new()
    }
}

impl GameSimulation {
    pub fn new() -> Self {
        Self::with_catalog(Catalog::standard())
    }

    pub fn with_catalog(catalog: Catalog) -> Self {
        let catalog = Arc::new(catalog);
        let waves = WaveScheduler::new(catalog.waves.clone());

        Self {
            phase: Phase::Lobby,
            tick: 0,
            base_hp: BASE_MAX_HP,
            max_waves: waves.total_waves(),
            prep_time_remaining: 0.0,
            wave_clock: 0.0,
            spawn_queue: VecDeque::new(),
            room: GameRoom::default(),
            economy: EconomySystem::new(),
            enemies: EnemySystem::new(catalog.map.waypoints.clone()),
            towers: TowerSystem::new(catalog.clone()),
            combat: CombatSystem::new(catalog.clone()),
            reactions: ReactionSystem::new(catalog.reactions.clone()),
            waves,
            events: Vec::new(),
            catalog,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    pub fn base_hp(&self) -> i32 {
        self.base_hp
    }

    pub fn gold(&self) -> u32 {
        self.economy.gold()
    }

    pub fn current_wave(&self) -> u32 {
        self.waves.current_wave()
    }

    pub fn prep_time_remaining(&self) -> f64 {
        self.prep_time_remaining
    }

    pub fn pending_spawns(&self) -> usize {
        self.spawn_queue.len()
    }

    pub fn player_count(&self) -> usize {
        self.room.player_count()
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn room(&self) -> &GameRoom {
        &self.room
    }

    pub fn enemies(&self) -> &EnemySystem {
        &self.enemies
    }

    pub fn towers(&self) -> &TowerSystem {
        &self.towers
    }

    /// Assembles the broadcast view of the match.
    pub fn snapshot(&self) -> GameState {
        GameState {
            phase: self.phase,
            wave: self.waves.current_wave(),
            max_waves: self.max_waves,
            base_hp: self.base_hp,
            max_base_hp: BASE_MAX_HP,
            economy: self.economy.state(),
            players: self.room.players().cloned().collect(),
            towers: self.towers.iter().cloned().collect(),
            enemies: self.enemies.iter().cloned().collect(),
            prep_time_remaining: self.prep_time_remaining,
            tick: self.tick,
        }
    }

    /// Hands over every event recorded since the previous call.
    pub fn drain_events(&mut self) -> Vec<ServerEvent> {
        std::mem::take(&mut self.events)
    }

    fn set_phase(&mut self, to: Phase) {
        if self.phase == to {
            return;
        }
        let from = self.phase;
        self.phase = to;
        info!("Phase {} -> {}", from, to);
        self.events.push(ServerEvent::PhaseChanged { from, to });
    }

    /// Runs one command on behalf of `player_id`.
    pub fn apply_command(&mut self, player_id: PlayerId, command: ClientCommand) -> CommandResult {
        let result = match command {
            ClientCommand::JoinGame { player_name } => {
                self.join_game(player_id, &player_name).map(|()| CommandResult {
                    player_id: Some(player_id),
                    ..CommandResult::ok()
                })
            }
            ClientCommand::SelectClass { element_class } => self
                .select_class(player_id, element_class)
                .map(|()| CommandResult::ok()),
            ClientCommand::ReadyUp => self.ready_up(player_id).map(|()| CommandResult::ok()),
            ClientCommand::PlaceTower { config_id, x, y } => self
                .place_tower(player_id, &config_id, x, y)
                .map(|tower_id| CommandResult {
                    tower_id: Some(tower_id),
                    ..CommandResult::ok()
                }),
            ClientCommand::UpgradeTower { instance_id } => self
                .upgrade_tower(player_id, instance_id)
                .map(|quote| CommandResult {
                    tower_id: Some(instance_id),
                    new_tier: Some(quote.tier),
                    ..CommandResult::ok()
                }),
            ClientCommand::SellTower { instance_id } => self
                .sell_tower(player_id, instance_id)
                .map(|refund| CommandResult {
                    tower_id: Some(instance_id),
                    gold_refund: Some(refund),
                    ..CommandResult::ok()
                }),
            ClientCommand::SetTargeting { instance_id, mode } => self
                .set_targeting(player_id, instance_id, mode)
                .map(|()| CommandResult {
                    tower_id: Some(instance_id),
                    ..CommandResult::ok()
                }),
            ClientCommand::StartWave => self.start_wave().map(|_| CommandResult::ok()),
            ClientCommand::Chat { message } => {
                self.chat(player_id, &message).map(|()| CommandResult::ok())
            }
        };

        result.unwrap_or_else(|err| {
            debug!("Rejected command from player {}: {}", player_id, err);
            CommandResult::rejected(err.to_string())
        })
    }

    pub fn join_game(&mut self, player_id: PlayerId, name: &str) -> Result<(), CommandError> {
        let name = self.room.add_player(player_id, name, self.phase)?.name.clone();
        self.towers.set_player_count(self.room.player_count());
        self.events.push(ServerEvent::PlayerJoined { player_id, name });
        Ok(())
    }

    pub fn select_class(
        &mut self,
        player_id: PlayerId,
        element: Element,
    ) -> Result<(), CommandError> {
        self.room.select_class(player_id, element, self.phase)?;
        self.try_start_game();
        Ok(())
    }

    pub fn ready_up(&mut self, player_id: PlayerId) -> Result<(), CommandError> {
        let next = self.room.ready_up(player_id, self.phase)?;
        self.set_phase(next);
        self.try_start_game();
        Ok(())
    }

    /// Drops a player from the roster. Their towers keep fighting.
    pub fn remove_player(&mut self, player_id: PlayerId) -> bool {
        if self.room.remove_player(player_id).is_none() {
            return false;
        }
        if matches!(self.phase, Phase::Lobby | Phase::ClassSelect) {
            self.towers.set_player_count(self.room.player_count());
        }
        self.events.push(ServerEvent::PlayerLeft { player_id });
        self.try_start_game();
        true
    }

    fn try_start_game(&mut self) {
        if self.phase == Phase::ClassSelect && self.room.all_ready() && self.room.all_classed() {
            self.start_game();
        }
    }

    /// Leaves class selection once every seated player is ready and has a
    /// class. Returns whether the match started.
    pub fn start_game(&mut self) -> bool {
        if self.phase != Phase::ClassSelect || !self.room.all_ready() || !self.room.all_classed() {
            return false;
        }
        let players = self.room.player_count();
        let starting_gold = self.economy.grant_starting_gold(players);
        self.max_waves = self.waves.total_waves();
        self.prep_time_remaining = PREP_PHASE_DURATION_SEC;
        self.set_phase(Phase::Prep);

        info!("Match started with {} players and {} gold", players, starting_gold);
        self.events.push(ServerEvent::GameStarted {
            players: players as u32,
            starting_gold,
        });
        true
    }

    fn ensure_build_phase(&self, action: &'static str) -> Result<(), CommandError> {
        match self.phase {
            Phase::Prep | Phase::Combat => Ok(()),
            phase => Err(CommandError::WrongPhase { action, phase }),
        }
    }

    fn ensure_owner(&self, player_id: PlayerId, tower_id: TowerId) -> Result<(), CommandError> {
        match self.towers.owner(tower_id) {
            None => Err(CommandError::TowerNotFound(tower_id)),
            Some(owner) if owner != player_id => Err(CommandError::NotTowerOwner(tower_id)),
            Some(_) => Ok(()),
        }
    }

    pub fn place_tower(
        &mut self,
        player_id: PlayerId,
        config_id: &str,
        x: i32,
        y: i32,
    ) -> Result<TowerId, CommandError> {
        self.ensure_build_phase("place towers")?;
        let player = self
            .room
            .get(player_id)
            .ok_or(CommandError::PlayerNotFound(player_id))?;

        let config = self.towers.check_placement(config_id, x, y)?;
        if let Some(class) = config.required_class {
            if player.element_class != Some(class) {
                return Err(CommandError::ClassRequired {
                    config_id: config_id.to_string(),
                    class,
                });
            }
        }
        let cost = config.cost;
        let available = self.economy.gold();
        if !self.economy.spend_gold(cost) {
            return Err(CommandError::InsufficientGold { cost, available });
        }

        let tower_id = match self.towers.place_tower(config_id, x, y, player_id) {
            Ok(tower_id) => tower_id,
            Err(err) => {
                self.economy.add_gold(cost);
                return Err(err);
            }
        };
        self.events.push(ServerEvent::TowerPlaced {
            tower_id,
            config_id: config_id.to_string(),
            owner_id: player_id,
            x,
            y,
        });
        Ok(tower_id)
    }

    /// Any seated player may upgrade any tower; gold is shared.
    pub fn upgrade_tower(
        &mut self,
        player_id: PlayerId,
        tower_id: TowerId,
    ) -> Result<UpgradeQuote, CommandError> {
        if !self.room.contains(player_id) {
            return Err(CommandError::PlayerNotFound(player_id));
        }
        let quote = self.towers.next_upgrade(tower_id)?;
        let available = self.economy.gold();
        if !self.economy.spend_gold(quote.cost) {
            return Err(CommandError::InsufficientGold {
                cost: quote.cost,
                available,
            });
        }

        let quote = match self.towers.upgrade_tower(tower_id) {
            Ok(quote) => quote,
            Err(err) => {
                self.economy.add_gold(quote.cost);
                return Err(err);
            }
        };
        self.events.push(ServerEvent::TowerUpgraded {
            tower_id,
            tier: quote.tier,
            cost: quote.cost,
        });
        Ok(quote)
    }

    pub fn sell_tower(
        &mut self,
        player_id: PlayerId,
        tower_id: TowerId,
    ) -> Result<u32, CommandError> {
        self.ensure_build_phase("sell towers")?;
        self.ensure_owner(player_id, tower_id)?;

        let base_cost = self.towers.sell_tower(tower_id)?;
        let gold_refund = self.economy.refund_tower(base_cost);
        self.events.push(ServerEvent::TowerSold {
            tower_id,
            gold_refund,
        });
        Ok(gold_refund)
    }

    pub fn set_targeting(
        &mut self,
        player_id: PlayerId,
        tower_id: TowerId,
        mode: TargetingMode,
    ) -> Result<(), CommandError> {
        self.ensure_owner(player_id, tower_id)?;
        self.towers.set_targeting(tower_id, mode)
    }

    /// Ends the build phase early. Returns the wave that started.
    pub fn start_wave(&mut self) -> Result<u32, CommandError> {
        if self.phase != Phase::Prep {
            return Err(CommandError::WrongPhase {
                action: "start a wave",
                phase: self.phase,
            });
        }
        let (wave, telegraph, enemy_count) = match self.waves.advance() {
            Some(config) => (config.wave, config.telegraph.clone(), config.enemy_count()),
            None => return Err(CommandError::NoWavesRemaining),
        };

        self.spawn_queue = self.waves.get_spawn_events(self.room.player_count()).into();
        self.wave_clock = 0.0;
        self.prep_time_remaining = 0.0;
        self.set_phase(Phase::Combat);
        self.events.push(ServerEvent::WaveStarted {
            wave,
            telegraph,
            enemy_count,
        });
        Ok(wave)
    }

    pub fn chat(&mut self, player_id: PlayerId, message: &str) -> Result<(), CommandError> {
        if !self.room.contains(player_id) {
            return Err(CommandError::PlayerNotFound(player_id));
        }
        let message = validate_message(message)?;
        self.events.push(ServerEvent::ChatMessage { player_id, message });
        Ok(())
    }

    /// Advances the match by `dt` seconds. Does nothing once the match is over.
    pub fn tick(&mut self, dt: f64) {
        if self.phase.is_terminal() {
            return;
        }
        self.tick += 1;
        // Enemies that died last tick stay visible for exactly one tick.
        self.enemies.clear_dead();

        match self.phase {
            Phase::Prep => {
                self.prep_time_remaining -= dt;
                if self.prep_time_remaining <= 0.0 {
                    self.prep_time_remaining = 0.0;
                    if let Err(err) = self.start_wave() {
                        debug!("Prep timer expired without a wave: {}", err);
                    }
                }
            }
            Phase::Combat => self.combat_tick(dt),
            _ => {}
        }
    }

    fn combat_tick(&mut self, dt: f64) {
        self.spawn_due(dt);

        self.enemies.update(dt);
        for enemy_id in self.enemies.status_kills().to_vec() {
            self.award_kill(enemy_id);
        }
        if self.apply_leaks() {
            return;
        }

        for tower_id in self.towers.ids() {
            let attack = match self.towers.get(tower_id) {
                Some(tower) => {
                    self.combat
                        .process_attack(tower, &self.towers, &self.enemies, self.tick)
                }
                None => None,
            };
            if let Some(attack) = attack {
                self.towers
                    .record_attack(tower_id, self.tick, attack.target_id);
                self.resolve_attack(attack);
            }
        }

        if self.spawn_queue.is_empty() && self.enemies.alive_count() == 0 {
            self.complete_wave();
        }
    }

    fn spawn_due(&mut self, dt: f64) {
        self.wave_clock += dt;
        while self
            .spawn_queue
            .front()
            .is_some_and(|event| event.spawn_at_sec <= self.wave_clock)
        {
            let Some(event) = self.spawn_queue.pop_front() else {
                break;
            };
            let enemy_id = self.enemies.spawn_enemy(
                event.enemy_type,
                event.hp,
                event.speed,
                event.armor,
                event.tags,
                event.resistances,
            );
            self.events.push(ServerEvent::EnemySpawned {
                enemy_id,
                enemy_type: event.enemy_type,
                hp: event.hp,
            });
        }
    }

    /// Charges the base for this tick's leaks. Returns true on defeat.
    fn apply_leaks(&mut self) -> bool {
        for enemy_id in self.enemies.leaked().to_vec() {
            let Some(enemy_type) = self.enemies.get(enemy_id).map(|e| e.enemy_type) else {
                continue;
            };
            let damage = leak_damage(enemy_type);
            self.base_hp = (self.base_hp - damage).max(0);
            debug!("{} {} leaked for {}", enemy_type, enemy_id, damage);
            self.events.push(ServerEvent::EnemyLeaked {
                enemy_id,
                damage,
                base_hp: self.base_hp,
            });
        }

        if self.base_hp > 0 {
            return false;
        }
        info!("Base destroyed on wave {}", self.waves.current_wave());
        self.set_phase(Phase::Defeat);
        self.events.push(ServerEvent::GameOver {
            victory: false,
            wave: self.waves.current_wave(),
        });
        true
    }

    fn resolve_attack(&mut self, attack: AttackResult) {
        self.events.push(ServerEvent::TowerFired {
            tower_id: attack.tower_id,
            target_id: attack.target_id,
            damage: attack.damage,
            element: attack.element,
            tower_x: attack.tower_position.x,
            tower_y: attack.tower_position.y,
            target_x: attack.target_position.x,
            target_y: attack.target_position.y,
        });

        self.hit(attack.target_id, attack.damage, attack.element);
        for enemy_id in &attack.splash_targets {
            self.hit(*enemy_id, attack.damage * SPLASH_DAMAGE_FACTOR, attack.element);
        }

        for effect in &attack.on_hit {
            let outcome = self.reactions.check_reaction(
                &mut self.enemies,
                attack.target_id,
                effect.element(),
                attack.damage,
            );
            let Some(outcome) = outcome else {
                self.enemies.apply_status(attack.target_id, effect.to_status());
                continue;
            };

            self.events.push(ServerEvent::ReactionTriggered {
                enemy_id: outcome.enemy_id,
                reaction: outcome.kind,
                damage: outcome.damage(),
            });
            match outcome.result {
                ReactionResult::BonusDamage(damage) => {
                    self.hit(attack.target_id, damage, None);
                }
                ReactionResult::ApplyStatus(status) => {
                    self.enemies.apply_status(attack.target_id, status);
                }
                ReactionResult::Burst { damage, radius } => {
                    let Some(center) = self.enemies.get(attack.target_id).map(|e| e.position)
                    else {
                        continue;
                    };
                    for enemy_id in self.enemies.alive_within(center, radius) {
                        self.hit(enemy_id, damage, None);
                    }
                }
            }
        }
    }

    /// Damages one enemy, scaling elemental damage by its resistance.
    fn hit(
        &mut self,
        enemy_id: EnemyId,
        raw_damage: f64,
        element: Option<Element>,
    ) -> Option<DamageDealt> {
        let resistance = match (element, self.enemies.get(enemy_id)) {
            (Some(element), Some(enemy)) => enemy.resistance(element),
            _ => 0.0,
        };
        let dealt = self
            .enemies
            .damage_enemy(enemy_id, raw_damage * (1.0 - resistance))?;
        if dealt.killed {
            self.award_kill(enemy_id);
        }
        Some(dealt)
    }

    fn award_kill(&mut self, enemy_id: EnemyId) {
        let Some(enemy_type) = self.enemies.get(enemy_id).map(|e| e.enemy_type) else {
            return;
        };
        let bounty = self
            .waves
            .current_config()
            .map(|config| config.bounty_gold)
            .unwrap_or(0);
        self.economy.add_gold(bounty);
        debug!("{} {} killed, +{} gold", enemy_type, enemy_id, bounty);
        self.events.push(ServerEvent::EnemyKilled {
            enemy_id,
            enemy_type,
            bounty,
        });
    }

    fn complete_wave(&mut self) {
        let wave = self.waves.current_wave();
        let gold_reward = self
            .economy
            .add_wave_bonus(wave, self.room.player_count());
        info!("Wave {} cleared, +{} gold", wave, gold_reward);
        self.events.push(ServerEvent::WaveCompleted { wave, gold_reward });

        if self.waves.has_more_waves() {
            self.prep_time_remaining = PREP_PHASE_DURATION_SEC;
            self.set_phase(Phase::Prep);
        } else {
            self.set_phase(Phase::Victory);
            self.events.push(ServerEvent::GameOver {
                victory: true,
                wave,
            });
        }
    }
}
