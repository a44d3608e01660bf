// kernel/src/arch/scb.rs
//
// 役割:
// - System Control Block のうち、起動シーケンスが触るレジスタ (VTOR / AIRCR / SHPR2 / SHPR3) を型で表す。
//
// やること:
// - レジスタごとに番地と「読める / 書ける / 鍵付きでしか書けない」を型で区別する。
// - AIRCR のビット配置を bitflags で定義する。
// - SHPR2/SHPR3 の優先度フィールドの詰め方/取り出し方。
//
// やらないこと:
// - NVIC の個別割込み優先度（カーネル本体側の責務）
//
// 重要:
// - AIRCR は上位 16bit に VECTKEY(0x05FA) が無い書き込みを黙って捨てる。
//   Aircr は Writable を実装しないので、write_keyed 以外では書けない。

use crate::arch::bus::WordBus;
use crate::types::{Addr, Word};

pub trait Register {
    const ADDR: Addr;
}

/// 読み出し可能なレジスタ
pub trait Readable: Register {}

/// 鍵なしで書けるレジスタ
pub trait Writable: Register {}

/// 同じ書き込みの中に鍵を含める必要があるレジスタ
pub trait Keyed: Register {
    /// 書き込み時に立てる鍵の値（KEY_MASK 内）
    const KEY: Word;
    /// 鍵が占めるビット
    const KEY_MASK: Word;
}

/// Vector Table Offset Register
pub enum Vtor {}
/// Application Interrupt and Reset Control Register
pub enum Aircr {}
/// System Handler Priority Register 2 (SVCall)
pub enum Shpr2 {}
/// System Handler Priority Register 3 (PendSV, SysTick)
pub enum Shpr3 {}

impl Register for Vtor {
    const ADDR: Addr = 0xE000_ED08;
}
impl Readable for Vtor {}
impl Writable for Vtor {}

impl Register for Aircr {
    const ADDR: Addr = 0xE000_ED0C;
}
impl Readable for Aircr {}
impl Keyed for Aircr {
    const KEY: Word = 0x05FA << 16;
    const KEY_MASK: Word = 0xFFFF << 16;
}

impl Register for Shpr2 {
    const ADDR: Addr = 0xE000_ED1C;
}
impl Readable for Shpr2 {}
impl Writable for Shpr2 {}

impl Register for Shpr3 {
    const ADDR: Addr = 0xE000_ED20;
}
impl Readable for Shpr3 {}
impl Writable for Shpr3 {}

bitflags::bitflags! {
    /// AIRCR のビット配置
    ///
    /// - VECTKEY: 書き込み時は 0x05FA、読み出し時は 0xFA05 (VECTKEYSTAT)
    /// - PRIGROUP: group / sub-priority の分割位置
    /// - SYSRESETREQ / VECTCLRACTIVE / VECTRESET: 書き込み専用の動作ビット（読むと 0）
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct AircrBits: u32 {
        const VECTRESET = 1 << 0;
        const VECTCLRACTIVE = 1 << 1;
        const SYSRESETREQ = 1 << 2;
        const PRIGROUP = 0b111 << 8;
        const ENDIANNESS = 1 << 15;
        const VECTKEY = 0xFFFF << 16;
    }
}

impl AircrBits {
    pub const PRIGROUP_SHIFT: u32 = 8;

    /// 読み出し時に上位 16bit に見える値
    pub const VECTKEYSTAT: Word = 0xFA05 << 16;

    pub fn prigroup(self) -> u32 {
        (self.bits() & Self::PRIGROUP.bits()) >> Self::PRIGROUP_SHIFT
    }

    /// PRIGROUP だけを差し替えた値を返す。
    pub fn with_prigroup(self, group: u32) -> Self {
        let field = (group << Self::PRIGROUP_SHIFT) & Self::PRIGROUP.bits();
        self.difference(Self::PRIGROUP) | Self::from_bits_retain(field)
    }

    /// 書き戻しに使ってよいビットだけを残す（鍵と動作ビットを落とす）
    pub fn writeback(self) -> Self {
        self.difference(Self::VECTKEY | Self::SYSRESETREQ | Self::VECTCLRACTIVE | Self::VECTRESET)
    }
}

/// SHPR2 の値: SVCall 優先度は [31:24]
pub const fn shpr2_value(svc: u8) -> Word {
    (svc as Word) << 24
}

/// SHPR3 の値: SysTick 優先度は [31:24]、PendSV 優先度は [23:16]
pub const fn shpr3_value(systick: u8, pendsv: u8) -> Word {
    ((systick as Word) << 24) | ((pendsv as Word) << 16)
}

pub const fn svc_field(shpr2: Word) -> u8 {
    (shpr2 >> 24) as u8
}

pub const fn systick_field(shpr3: Word) -> u8 {
    (shpr3 >> 24) as u8
}

pub const fn pendsv_field(shpr3: Word) -> u8 {
    (shpr3 >> 16) as u8
}

/// 型付きレジスタアクセス
pub struct Scb<'a, B: WordBus + ?Sized> {
    bus: &'a mut B,
}

impl<'a, B: WordBus + ?Sized> Scb<'a, B> {
    pub fn new(bus: &'a mut B) -> Self {
        Scb { bus }
    }

    #[inline(always)]
    pub fn read<R: Readable>(&self) -> Word {
        self.bus.read_word(R::ADDR)
    }

    #[inline(always)]
    pub fn write<R: Writable>(&mut self, value: Word) {
        self.bus.write_word(R::ADDR, value);
    }

    /// 鍵付き書き込み。value の鍵ビットは捨てて R::KEY に置き換える。
    #[inline(always)]
    pub fn write_keyed<R: Keyed>(&mut self, value: Word) {
        self.bus.write_word(R::ADDR, (value & !R::KEY_MASK) | R::KEY);
    }
}
