// kernel/src/boot/mod.rs
//
// kernel-start: リセット直後からカーネル本体へ制御を渡すまでの起動シーケンス
//
// 順序（この順でしか動かさない）:
//   1. Interrupt Gate      : BASEPRI でマスク -> PRIMASK 解除
//   2. Section 初期化       : copy table -> zero table
//   3. ボード初期化          : 外部 (クロック・ピン設定)
//   4. ベクタテーブル再配置   : ROM -> RAM、VTOR 付け替え、元番地を公開
//   5. 例外優先度            : PRIGROUP 4:4、SVC=0 / SysTick=1 / PendSV=7
//   6. システムクロック       : 外部に問い合わせて公開
//   7. メモリ領域            : (imalloc) top / limit を決めて公開
//   8. 引き渡し              : カーネル入口を呼ぶ。戻ってきたら停止ループ
//
// [設計上の不変条件]
//
// 1. 1〜2 の間は static を読まない（未初期化）。logging / trace は 2 の後から。
// 2. 4 より前に 1 が終わっている（再配置中に割込みが入らない）。
// 3. 起動は BootToken 1 つにつき 1 回。トークンは prepare が消費する。
// 4. 公開した値 (BootState) は以後変わらない。
//
// 失敗時の経路は持たない。構成の前提はビルド時に検査し、
// 実行時に観測できる唯一の異常（カーネル入口が戻る）は停止ループで受ける。

pub mod state;
pub mod trace;

#[cfg(all(target_arch = "arm", target_os = "none"))]
pub mod entry;

use crate::arch::bus::WordBus;
use crate::arch::scb::Scb;
use crate::arch::priority::{self, SystemPriorities};
use crate::arch::{self, interrupts, vector, Cpu};
use crate::logging;
use crate::mem::region::SystemMemory;
use crate::mem::section::{self, SectionTables};
use crate::types::Addr;

use self::state::{BootState, BootToken};
use self::trace::{trace_step, BootStep};

/// カーネル本体の入口。正しく動いていれば戻らない。
pub type KernelEntry = unsafe extern "C" fn();

/// ボード依存の外部処理
pub trait Board {
    /// クロックツリー・ピン設定など。割込みマスク中に 1 回だけ呼ばれる。
    fn startup_hw(&mut self);
    /// 設定済みのシステムクロック周波数 [Hz]
    fn sysclk_hz(&mut self) -> u32;
}

impl<T: Board + ?Sized> Board for &mut T {
    fn startup_hw(&mut self) {
        (**self).startup_hw()
    }

    fn sysclk_hz(&mut self) -> u32 {
        (**self).sysclk_hz()
    }
}

/// 起動シーケンスが使うハードウェア一式
pub struct BootHw<B, C, P> {
    pub bus: B,
    pub cpu: C,
    pub board: P,
}

/// リンカ・ビルド構成から与えられる入力
#[derive(Clone, Copy, Debug)]
pub struct BootPlan<'a> {
    pub sections: SectionTables<'a>,
    /// RAM 上のベクタテーブルの番地
    pub runtime_vector_table: Addr,
    /// コピーするベクタ数
    pub vector_count: usize,
    pub system_memory: SystemMemory,
    /// リンカシンボル `end` の番地
    pub image_end: Addr,
}

/// 1〜7 を実行し、引き渡し直前の状態を返す。
pub fn prepare<B, C, P>(
    token: BootToken,
    hw: BootHw<B, C, P>,
    plan: &BootPlan<'_>,
    state: &BootState,
) -> Handoff<C>
where
    B: WordBus,
    C: Cpu,
    P: Board,
{
    let _ = token;
    let BootHw {
        mut bus,
        mut cpu,
        mut board,
    } = hw;

    interrupts::open_gate(&mut cpu);
    section::init_sections(&mut bus, &plan.sections);

    // ここから static が使える
    logging::init();
    trace_step(BootStep::InterruptGate);
    trace_step(BootStep::Sections);

    board.startup_hw();
    trace_step(BootStep::StartupHw);

    let reloc = vector::relocate(&mut bus, plan.runtime_vector_table, plan.vector_count);
    state.publish_origin_vector_table(reloc.origin);
    logging::info_hex("boot: vector table origin", reloc.origin as u64);
    logging::info_hex("boot: vector table runtime", reloc.runtime as u64);
    trace_step(BootStep::VectorTable);

    let mut scb = Scb::new(&mut bus);
    priority::configure(&mut scb);
    let applied = priority::read_back(&scb);
    if applied != SystemPriorities::EXPECTED {
        // 鍵の欠落などで書き込みが捨てられた。続行はするが痕跡を残す
        logging::error("boot: exception priorities did not take effect");
    }
    logging::info_kv("boot: prigroup", applied.prigroup as u64);
    trace_step(BootStep::Priorities);

    let hz = board.sysclk_hz();
    state.publish_system_clock(hz);
    logging::info_kv("boot: sysclk", hz as u64);
    trace_step(BootStep::SystemClock);

    #[cfg(feature = "imalloc")]
    {
        let region = plan.system_memory.region(plan.image_end);
        state.publish_low_memory(region);
        logging::info_hex("boot: low memory top", region.top as u64);
        logging::info_hex("boot: low memory limit", region.limit as u64);
        logging::info_kv("boot: low memory bytes", region.size_bytes() as u64);
        trace_step(BootStep::LowMemory);
    }

    Handoff { cpu }
}

/// 1〜8 を実行する（戻らない）
///
/// # Safety
/// - `entry` は有効なカーネル入口であること。
pub unsafe fn run<B, C, P>(
    token: BootToken,
    hw: BootHw<B, C, P>,
    plan: &BootPlan<'_>,
    state: &BootState,
    entry: KernelEntry,
) -> !
where
    B: WordBus,
    C: Cpu,
    P: Board,
{
    let handoff = prepare(token, hw, plan, state);
    // Safety: 呼び出し側の前提
    unsafe { handoff.enter(entry) }
}

/// 引き渡し直前の状態。CPU だけを持ち、入口を呼ぶ以外のことはできない。
#[must_use]
pub struct Handoff<C: Cpu> {
    cpu: C,
}

impl<C: Cpu> Handoff<C> {
    /// カーネル入口を呼ぶ。戻ってきたら停止ループに入る。
    ///
    /// # Safety
    /// - `entry` は有効なカーネル入口であること。
    pub unsafe fn enter(self, entry: KernelEntry) -> ! {
        // Safety: 呼び出し側の前提
        let returned = unsafe { self.call(entry) };
        returned.park()
    }

    /// カーネル入口を呼び、万一戻ってきた場合だけ KernelReturned を返す。
    ///
    /// # Safety
    /// - `entry` は有効なカーネル入口であること。
    pub unsafe fn call(self, entry: KernelEntry) -> KernelReturned<C> {
        trace_step(BootStep::Handoff);
        logging::info("boot: entering kernel");

        // Safety: 呼び出し側の前提
        unsafe { entry() };

        logging::error("boot: kernel entry returned; parking cpu");
        KernelReturned { cpu: self.cpu }
    }
}

/// カーネル入口が戻ってきた後の終端状態
#[must_use]
pub struct KernelReturned<C: Cpu> {
    cpu: C,
}

impl<C: Cpu> KernelReturned<C> {
    /// 停止ループ（任意のメモリを命令として実行し続けるよりは、ここで止まる）
    pub fn park(mut self) -> ! {
        arch::park(&mut self.cpu)
    }
}
