// Demo Orchestrator - walks the three custody engines through their lifecycles
// and shows the external approve-then-lock two-phase protocol.

use anyhow::Result;
use custody_core::{
    AccountId, Amount, AssetId, Clock, Config, Error, InMemoryBank, ManualClock, MemorySink,
    Metrics,
};
use escrow_engine::EscrowEngine;
use savings_engine::{SavingsEngine, SECONDS_PER_DAY};
use std::sync::Arc;
use vault_engine::VaultEngine;

struct Demo {
    bank: Arc<InMemoryBank>,
    clock: Arc<ManualClock>,
    sink: Arc<MemorySink>,
    escrow: EscrowEngine,
    savings: SavingsEngine,
    vault: VaultEngine,
    config: Config,
}

impl Demo {
    fn new() -> Result<Self> {
        let config = Config::default();
        let bank = Arc::new(InMemoryBank::new());
        let clock = Arc::new(ManualClock::new(1_700_000_000));
        let sink = Arc::new(MemorySink::new());
        let metrics = Metrics::new()?;

        let escrow = EscrowEngine::new(
            &config.escrow,
            bank.clone(),
            sink.clone(),
            metrics.clone(),
        );
        let savings = SavingsEngine::new(
            &config.savings,
            bank.clone(),
            clock.clone(),
            sink.clone(),
            metrics.clone(),
        );
        let vault = VaultEngine::new(&config.vault, bank.clone(), sink.clone(), metrics);

        Ok(Self {
            bank,
            clock,
            sink,
            escrow,
            savings,
            vault,
            config,
        })
    }

    /// Phase 1 of the external protocol: grant the engine an allowance and
    /// observe its success before issuing the dependent locking call.
    fn grant_allowance(&self, owner: &AccountId, engine_account: &str, asset: &AssetId, amount: Amount) {
        let spender = AccountId::new(engine_account);
        self.bank.approve(owner, &spender, asset, amount);

        // The grant settled; only now is the locking call safe to issue
        let granted = self.bank.allowance(owner, &spender, asset);
        tracing::info!(%owner, %spender, %granted, "phase 1 settled: allowance in place");
    }

    fn run_escrow_scenario(&self) -> Result<()> {
        println!("\n== Escrow: two-party conditional transfer ==");
        let seller = AccountId::new("alice");
        let buyer = AccountId::new("bob");
        let usdc = AssetId::new("USDC");

        // A locking call issued before the allowance lands simply fails and
        // may be retried after phase 1.
        let premature =
            self.escrow
                .create_trade(&seller, &buyer, &usdc, Amount::new(100), "widget");
        println!(
            "create before approval -> {}",
            premature.expect_err("must fail without allowance")
        );

        self.grant_allowance(
            &seller,
            &self.config.escrow.custody_account,
            &usdc,
            Amount::new(100),
        );
        let trade_id = self
            .escrow
            .create_trade(&seller, &buyer, &usdc, Amount::new(100), "widget")?;
        println!("trade {} created, 100 USDC in escrow custody", trade_id);

        self.escrow.confirm_trade(&buyer, trade_id)?;
        println!(
            "buyer confirmed, wallet now {} USDC",
            self.bank.balance_of(&buyer, &usdc)
        );

        match self.escrow.confirm_trade(&buyer, trade_id) {
            Err(Error::AlreadyFinalized(_)) => println!("replayed confirm correctly rejected"),
            other => anyhow::bail!("unexpected outcome: {:?}", other.map(|_| ())),
        }
        Ok(())
    }

    fn run_savings_scenario(&self) -> Result<()> {
        println!("\n== Savings: self-custodial time lock ==");
        let owner = AccountId::new("alice");
        let usdc = AssetId::new("USDC");

        self.grant_allowance(
            &owner,
            &self.config.savings.custody_account,
            &usdc,
            Amount::new(250),
        );
        let index = self
            .savings
            .create_saving(&owner, &usdc, Amount::new(250), 3, "new laptop")?;
        println!(
            "saving {} locked for 3 days ({} seconds remain)",
            index,
            self.savings.time_until_unlock(&owner, index)?
        );

        match self.savings.withdraw_saving(&owner, index) {
            Err(Error::NotYetUnlocked(remaining)) => {
                println!("early withdrawal rejected, {} seconds remain", remaining)
            }
            other => anyhow::bail!("unexpected outcome: {:?}", other.map(|_| ())),
        }

        self.clock.advance(3 * SECONDS_PER_DAY);
        println!("three days pass (clock now {})", self.clock.now_unix());
        self.savings.withdraw_saving(&owner, index)?;
        println!(
            "withdrawn, wallet back to {} USDC",
            self.bank.balance_of(&owner, &usdc)
        );
        Ok(())
    }

    fn run_vault_scenario(&self) -> Result<()> {
        println!("\n== Vault: free multi-token balances ==");
        let account = AccountId::new("bob");
        let usdc = AssetId::new("USDC");

        self.grant_allowance(
            &account,
            &self.config.vault.custody_account,
            &usdc,
            Amount::new(100),
        );
        self.vault.deposit(&account, &usdc, Amount::new(100))?;
        println!(
            "deposited 100, vault balance {}",
            self.vault.balance(&account, &usdc)
        );

        match self.vault.withdraw(&account, &usdc, Amount::new(150)) {
            Err(Error::InsufficientFunds(_)) => println!("overdraft correctly rejected"),
            other => anyhow::bail!("unexpected outcome: {:?}", other.map(|_| ())),
        }

        self.vault.withdraw(&account, &usdc, Amount::new(100))?;
        println!(
            "withdrew 100, vault balance {} / wallet {}",
            self.vault.balance(&account, &usdc),
            self.bank.balance_of(&account, &usdc)
        );
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    println!("=========================================================");
    println!(" DivaSave Custody Core - Engine Walkthrough");
    println!(" Escrow | Savings | Vault over one transfer primitive");
    println!("=========================================================");

    let demo = Demo::new()?;
    let usdc = AssetId::new("USDC");

    // Seed wallets (externally-custodied funds)
    demo.bank
        .mint(&AccountId::new("alice"), &usdc, Amount::new(350))?;
    demo.bank
        .mint(&AccountId::new("bob"), &usdc, Amount::new(100))?;

    demo.run_escrow_scenario()?;
    demo.run_savings_scenario()?;
    demo.run_vault_scenario()?;

    println!("\n== Audit trail ==");
    for event in demo.sink.events() {
        println!(
            "{} {}",
            event.timestamp.format("%H:%M:%S"),
            serde_json::to_string(&event.kind)?
        );
    }

    Ok(())
}
