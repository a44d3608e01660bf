// kernel/src/arch/priority.rs
//
// 役割:
// - 優先度グルーピング (AIRCR.PRIGROUP) と、SVCall / SysTick / PendSV の優先度を固定値に設定する。
//
// やること:
// - AIRCR を読んで PRIGROUP だけを 4:4 分割に差し替え、鍵付きで書き戻す
// - SHPR2 <- SVCall、SHPR3 <- SysTick | PendSV
//
// やらないこと:
// - 外部割込みの優先度（カーネル本体の責務）
//
// 設計上の不変条件:
// - SVCall(0) は SysTick(1) をプリエンプトし、SysTick は PendSV(7) をプリエンプトする。
//   スケジューラの並行性モデルはこの順序に依存する。
// - group 優先度だけがプリエンプションを決める。sub-priority は同 group 内の保留順のみ。

use crate::arch::bus::WordBus;
use crate::arch::scb::{self, Aircr, AircrBits, Scb, Shpr2, Shpr3};
use crate::config::{
    intpri_of, intpri_val, INTPRI_PENDSV, INTPRI_SVC, INTPRI_SYSTICK, PRIGROUP_4_4,
};

/// 読み戻した優先度設定（論理値）
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SystemPriorities {
    pub prigroup: u32,
    pub svc: u8,
    pub systick: u8,
    pub pendsv: u8,
}

impl SystemPriorities {
    /// 起動シーケンスが設定すべき値
    pub const EXPECTED: SystemPriorities = SystemPriorities {
        prigroup: PRIGROUP_4_4,
        svc: INTPRI_SVC,
        systick: INTPRI_SYSTICK,
        pendsv: INTPRI_PENDSV,
    };
}

pub fn configure<B: WordBus + ?Sized>(scb: &mut Scb<'_, B>) {
    let current = AircrBits::from_bits_retain(scb.read::<Aircr>());
    let next = current.writeback().with_prigroup(PRIGROUP_4_4);
    scb.write_keyed::<Aircr>(next.bits());

    scb.write::<Shpr2>(scb::shpr2_value(intpri_val(INTPRI_SVC)));
    scb.write::<Shpr3>(scb::shpr3_value(
        intpri_val(INTPRI_SYSTICK),
        intpri_val(INTPRI_PENDSV),
    ));
}

pub fn read_back<B: WordBus + ?Sized>(scb: &Scb<'_, B>) -> SystemPriorities {
    let aircr = AircrBits::from_bits_retain(scb.read::<Aircr>());
    let shpr2 = scb.read::<Shpr2>();
    let shpr3 = scb.read::<Shpr3>();
    SystemPriorities {
        prigroup: aircr.prigroup(),
        svc: intpri_of(scb::svc_field(shpr2)),
        systick: intpri_of(scb::systick_field(shpr3)),
        pendsv: intpri_of(scb::pendsv_field(shpr3)),
    }
}
