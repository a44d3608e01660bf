// kernel/src/testing.rs
//
// ホスト上のテスト専用の模擬ハードウェア。
// - SimBus: 疎なワードメモリ + AIRCR の鍵ハザード
// - SimCpu: Interrupt Gate の操作を記録し、停止ループは一定回数で panic して抜ける
// - SimBoard: ボード初期化 / クロック問い合わせを記録
// - Journal: 上の全部が 1 本の時系列に書き込むイベント列（順序の検証に使う）

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::Rc;

use crate::arch::bus::WordBus;
use crate::arch::scb::{Aircr, AircrBits, Keyed, Register};
use crate::arch::Cpu;
use crate::boot::Board;
use crate::types::{word_addr, Addr, Word};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Event {
    SetBasepri(u8),
    EnableIrq,
    Idle,
    Read(Addr),
    Write(Addr, Word),
    /// 鍵なしで捨てられた書き込み
    IgnoredWrite(Addr, Word),
    StartupHw,
    QuerySysclk,
    KernelEntered,
}

#[derive(Clone, Default)]
pub struct Journal(Rc<RefCell<Vec<Event>>>);

impl Journal {
    pub fn new() -> Self {
        Journal::default()
    }

    pub fn push(&self, ev: Event) {
        self.0.borrow_mut().push(ev);
    }

    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }

    pub fn events(&self) -> Vec<Event> {
        self.0.borrow().clone()
    }

    /// 受理された書き込みだけを (addr, value) で返す
    pub fn writes(&self) -> Vec<(Addr, Word)> {
        self.0
            .borrow()
            .iter()
            .filter_map(|ev| match *ev {
                Event::Write(addr, value) => Some((addr, value)),
                _ => None,
            })
            .collect()
    }

    pub fn position(&self, ev: Event) -> Option<usize> {
        self.0.borrow().iter().position(|e| *e == ev)
    }

    pub fn first_write_to(&self, addr: Addr) -> Option<usize> {
        self.0
            .borrow()
            .iter()
            .position(|e| matches!(*e, Event::Write(a, _) if a == addr))
    }

    pub fn last_write_to(&self, addr: Addr) -> Option<usize> {
        self.0
            .borrow()
            .iter()
            .rposition(|e| matches!(*e, Event::Write(a, _) if a == addr))
    }
}

// ─────────────────────────────────────────────
// SimBus
// ─────────────────────────────────────────────

pub struct SimBus {
    mem: BTreeMap<Addr, Word>,
    /// AIRCR のうち保持されるビット（PRIGROUP / ENDIANNESS）
    aircr: Word,
    journal: Journal,
}

impl SimBus {
    pub fn new(journal: &Journal) -> Self {
        SimBus {
            mem: BTreeMap::new(),
            aircr: 0,
            journal: journal.clone(),
        }
    }

    /// 記録を残さずにメモリへ書く（テストの前準備）
    pub fn load(&mut self, base: Addr, words: &[Word]) {
        for (i, &w) in words.iter().enumerate() {
            self.mem.insert(word_addr(base, i as u32), w);
        }
    }

    /// AIRCR の保持ビットを直接仕込む
    pub fn preset_aircr(&mut self, bits: AircrBits) {
        self.aircr = (bits & (AircrBits::PRIGROUP | AircrBits::ENDIANNESS)).bits();
    }

    /// 記録を残さずにメモリを読む
    pub fn peek(&self, addr: Addr) -> Word {
        if addr == Aircr::ADDR {
            return AircrBits::VECTKEYSTAT | self.aircr;
        }
        self.mem.get(&addr).copied().unwrap_or(0)
    }

    pub fn dump(&self, base: Addr, len: usize) -> Vec<Word> {
        (0..len as u32).map(|i| self.peek(word_addr(base, i))).collect()
    }
}

impl WordBus for SimBus {
    fn read_word(&self, addr: Addr) -> Word {
        self.journal.push(Event::Read(addr));
        self.peek(addr)
    }

    fn write_word(&mut self, addr: Addr, value: Word) {
        if addr == Aircr::ADDR {
            if value & Aircr::KEY_MASK != Aircr::KEY {
                self.journal.push(Event::IgnoredWrite(addr, value));
                return;
            }
            // ENDIANNESS は読み出し専用、動作ビットは保持されない
            let endianness = self.aircr & AircrBits::ENDIANNESS.bits();
            self.aircr = endianness | (value & AircrBits::PRIGROUP.bits());
        } else {
            self.mem.insert(addr, value);
        }
        self.journal.push(Event::Write(addr, value));
    }
}

// ─────────────────────────────────────────────
// SimCpu
// ─────────────────────────────────────────────

/// 停止ループから抜けるための panic ペイロード
#[derive(Debug, PartialEq, Eq)]
pub struct Parked {
    pub idles: usize,
}

pub struct SimCpu {
    journal: Journal,
    idle_budget: usize,
    idled: usize,
}

impl SimCpu {
    pub const IDLE_BUDGET: usize = 32;

    pub fn new(journal: &Journal) -> Self {
        SimCpu {
            journal: journal.clone(),
            idle_budget: Self::IDLE_BUDGET,
            idled: 0,
        }
    }
}

impl Cpu for SimCpu {
    fn set_basepri(&mut self, value: u8) {
        self.journal.push(Event::SetBasepri(value));
    }

    fn enable_irq(&mut self) {
        self.journal.push(Event::EnableIrq);
    }

    fn idle(&mut self) {
        self.journal.push(Event::Idle);
        self.idled += 1;
        if self.idled >= self.idle_budget {
            std::panic::panic_any(Parked { idles: self.idled });
        }
    }
}

/// 停止ループに入ったことを panic ペイロードで確認する
pub fn expect_parked<F: FnOnce()>(f: F) -> Parked {
    let err = std::panic::catch_unwind(std::panic::AssertUnwindSafe(f))
        .expect_err("cpu was expected to park");
    *err.downcast::<Parked>().expect("unexpected panic payload")
}

// ─────────────────────────────────────────────
// SimBoard / kernel entry
// ─────────────────────────────────────────────

pub struct SimBoard {
    journal: Journal,
    sysclk_hz: u32,
}

impl SimBoard {
    pub fn new(journal: &Journal, sysclk_hz: u32) -> Self {
        SimBoard {
            journal: journal.clone(),
            sysclk_hz,
        }
    }
}

impl Board for SimBoard {
    fn startup_hw(&mut self) {
        self.journal.push(Event::StartupHw);
    }

    fn sysclk_hz(&mut self) -> u32 {
        self.journal.push(Event::QuerySysclk);
        self.sysclk_hz
    }
}

thread_local! {
    static KERNEL_JOURNAL: RefCell<Option<Journal>> = RefCell::new(None);
    static KERNEL_ENTRIES: Cell<u32> = Cell::new(0);
}

/// returning_kernel が記録する先を設定する（スレッドごと）
pub fn attach_kernel_journal(journal: &Journal) {
    KERNEL_JOURNAL.with(|j| *j.borrow_mut() = Some(journal.clone()));
    KERNEL_ENTRIES.with(|c| c.set(0));
}

pub fn kernel_entries() -> u32 {
    KERNEL_ENTRIES.with(|c| c.get())
}

/// 本来は戻らないはずのカーネル入口。ここでは 1 回記録して戻ってしまう。
pub unsafe extern "C" fn returning_kernel() {
    KERNEL_ENTRIES.with(|c| c.set(c.get() + 1));
    KERNEL_JOURNAL.with(|j| {
        if let Some(journal) = j.borrow().as_ref() {
            journal.push(Event::KernelEntered);
        }
    });
}
